//! Platform trait definitions
//!
//! - `PipelineSource`: the platform the pipelines run on (project search, pipeline listing)
//! - `StatusTarget`: the platform commit statuses are published to
//!
//! HTTP implementations live in `gitlab` and `github`; in-memory fakes for
//! testing live in `fakes`.

use async_trait::async_trait;

use crate::config::RepoSlug;
use crate::pipeline::{Pipeline, ProjectSummary};
use crate::status::{PublishOutcome, StatusReport};
use crate::Result;

/// Read-only view of the source pipeline platform.
#[async_trait]
pub trait PipelineSource: Send + Sync {
    /// Projects matching a search term, in the platform's ranking order.
    async fn search_projects(&self, term: &str) -> Result<Vec<ProjectSummary>>;

    /// All pipelines of a project, newest first, in one unpaginated call.
    async fn list_pipelines(&self, project_id: u64) -> Result<Vec<Pipeline>>;
}

/// Commit status endpoint of the target platform.
#[async_trait]
pub trait StatusTarget: Send + Sync {
    /// Create a status for `sha`. A refusal by the platform is an `Ok(Rejected)`.
    async fn create_status(
        &self,
        repo: &RepoSlug,
        sha: &str,
        report: &StatusReport,
    ) -> Result<PublishOutcome>;
}
