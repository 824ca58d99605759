//! The relay run: resolve the source project, pick its pipeline, wait while it
//! runs, then publish the mapped status on the target platform.

use tracing::debug;

use crate::config::{project_search_term, RelayConfig, RepoSlug};
use crate::error::RelayError;
use crate::obs;
use crate::pipeline::{select_pipeline, Pipeline};
use crate::platform::{PipelineSource, StatusTarget};
use crate::poll::poll_until_settled;
use crate::status::{PublishOutcome, StatusReport};
use crate::Result;

/// Result of one relay run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    pub project_id: u64,
    pub pipeline: Pipeline,
    pub report: StatusReport,
    pub publish: PublishOutcome,
}

/// Resolve a source repository URL to the platform's numeric project id.
///
/// The first search hit wins; no hit is `RelayError::ProjectNotFound`.
pub async fn resolve_project(source: &dyn PipelineSource, repo_url: &str) -> Result<u64> {
    let search = project_search_term(repo_url)?;
    let projects = source.search_projects(&search).await?;

    let project = projects
        .first()
        .ok_or_else(|| RelayError::ProjectNotFound {
            search: search.clone(),
        })?;

    if projects.len() > 1 {
        debug!(
            search = %search,
            hits = projects.len(),
            "several projects match, using the first"
        );
    }

    obs::emit_project_resolved(&search, project.id);
    Ok(project.id)
}

/// Fetch the project's pipelines and select the one to report on.
pub async fn find_pipeline(
    source: &dyn PipelineSource,
    project_id: u64,
    branches: &[String],
    commit_sha: Option<&str>,
) -> Result<Pipeline> {
    let pipelines = source.list_pipelines(project_id).await?;
    debug!(project_id, count = pipelines.len(), "fetched pipelines");

    let pipeline = select_pipeline(&pipelines, branches, commit_sha)?;
    obs::emit_pipeline_selected(&pipeline);
    Ok(pipeline)
}

/// Send a report for `sha`. Identical calls send identical requests.
pub async fn publish_status(
    target: &dyn StatusTarget,
    repo: &RepoSlug,
    sha: &str,
    report: &StatusReport,
) -> Result<PublishOutcome> {
    let outcome = target.create_status(repo, sha, report).await?;

    match &outcome {
        PublishOutcome::Created => obs::emit_status_published(sha, report),
        PublishOutcome::Rejected { status, body } => obs::emit_publish_rejected(sha, *status, body),
    }
    Ok(outcome)
}

/// Run the whole relay once.
///
/// A rejected publish is returned in `RelayOutcome::publish`, not as an error.
pub async fn run_relay(
    config: &RelayConfig,
    source: &dyn PipelineSource,
    target: &dyn StatusTarget,
) -> Result<RelayOutcome> {
    config.validate()?;
    let repo = config.target_slug()?;
    let commit_sha = config.commit_sha.as_deref();

    obs::emit_relay_started(&config.source_repo, &config.target_repo, commit_sha);

    let project_id = resolve_project(source, &config.source_repo).await?;

    let pipeline = poll_until_settled(
        || find_pipeline(source, project_id, &config.branches, commit_sha),
        &config.poll,
    )
    .await?;

    let report = StatusReport::from_pipeline(&pipeline, &config.context);
    let publish = publish_status(target, &repo, &pipeline.sha, &report).await?;

    Ok(RelayOutcome {
        project_id,
        pipeline,
        report,
        publish,
    })
}
