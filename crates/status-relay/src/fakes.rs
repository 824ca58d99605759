//! In-memory fakes for the platform traits (testing only)
//!
//! Provides `MemoryPipelineSource` and `RecordingStatusTarget`, which satisfy
//! the trait contracts without any network access.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::config::RepoSlug;
use crate::error::RelayError;
use crate::pipeline::{Pipeline, ProjectSummary};
use crate::platform::{PipelineSource, StatusTarget};
use crate::status::{PublishOutcome, StatusReport};
use crate::Result;

// ---------------------------------------------------------------------------
// MemoryPipelineSource
// ---------------------------------------------------------------------------

/// Pipeline source answering from fixed project results and scripted pipeline listings.
///
/// Each call to `with_pipelines` queues one listing for the project. Listings
/// are served in order; the last one keeps being served once the queue is drained.
#[derive(Debug, Default)]
pub struct MemoryPipelineSource {
    projects: HashMap<String, Vec<ProjectSummary>>,
    listings: Mutex<HashMap<u64, VecDeque<Vec<Pipeline>>>>,
    searches: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
}

impl MemoryPipelineSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer searches for `term` with a single project.
    pub fn with_project(mut self, term: &str, project_id: u64) -> Self {
        self.projects
            .entry(term.to_string())
            .or_default()
            .push(ProjectSummary::new(project_id));
        self
    }

    /// Queue one pipeline listing for `project_id`.
    pub fn with_pipelines(self, project_id: u64, pipelines: Vec<Pipeline>) -> Self {
        self.listings
            .lock()
            .unwrap()
            .entry(project_id)
            .or_default()
            .push_back(pipelines);
        self
    }

    /// Search terms received so far.
    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    /// Number of pipeline listings served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PipelineSource for MemoryPipelineSource {
    async fn search_projects(&self, term: &str) -> Result<Vec<ProjectSummary>> {
        self.searches.lock().unwrap().push(term.to_string());
        Ok(self.projects.get(term).cloned().unwrap_or_default())
    }

    async fn list_pipelines(&self, project_id: u64) -> Result<Vec<Pipeline>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let mut listings = self.listings.lock().unwrap();
        let queue = listings
            .get_mut(&project_id)
            .ok_or_else(|| RelayError::UnexpectedResponse {
                endpoint: format!("GET /projects/{project_id}/pipelines"),
                status: 404,
                body: "404 Project Not Found".to_string(),
            })?;

        if queue.len() > 1 {
            Ok(queue.pop_front().unwrap_or_default())
        } else {
            Ok(queue.front().cloned().unwrap_or_default())
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingStatusTarget
// ---------------------------------------------------------------------------

/// A status request captured by `RecordingStatusTarget`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedStatus {
    pub repo: RepoSlug,
    pub sha: String,
    pub report: StatusReport,
}

/// Status target that records every request and answers with a fixed outcome.
#[derive(Debug)]
pub struct RecordingStatusTarget {
    outcome: PublishOutcome,
    published: Mutex<Vec<PublishedStatus>>,
}

impl Default for RecordingStatusTarget {
    fn default() -> Self {
        Self {
            outcome: PublishOutcome::Created,
            published: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingStatusTarget {
    /// A target that accepts every status.
    pub fn new() -> Self {
        Self::default()
    }

    /// A target that refuses every status with the given code and body.
    pub fn rejecting(status: u16, body: &str) -> Self {
        Self {
            outcome: PublishOutcome::Rejected {
                status,
                body: body.to_string(),
            },
            published: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in order.
    pub fn published(&self) -> Vec<PublishedStatus> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusTarget for RecordingStatusTarget {
    async fn create_status(
        &self,
        repo: &RepoSlug,
        sha: &str,
        report: &StatusReport,
    ) -> Result<PublishOutcome> {
        self.published.lock().unwrap().push(PublishedStatus {
            repo: repo.clone(),
            sha: sha.to_string(),
            report: report.clone(),
        });
        Ok(self.outcome.clone())
    }
}
