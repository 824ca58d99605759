//! Pipeline records read from the source platform and the selection policy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::Result;

/// Native pipeline status on the source platform.
///
/// Statuses outside the known vocabulary are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PipelineStatus {
    Running,
    Success,
    Failed,
    Canceled,
    Skipped,
    Manual,
    Pending,
    Other(String),
}

impl PipelineStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PipelineStatus::Running => "running",
            PipelineStatus::Success => "success",
            PipelineStatus::Failed => "failed",
            PipelineStatus::Canceled => "canceled",
            PipelineStatus::Skipped => "skipped",
            PipelineStatus::Manual => "manual",
            PipelineStatus::Pending => "pending",
            PipelineStatus::Other(raw) => raw.as_str(),
        }
    }

    /// Statuses accepted when picking a pipeline by branch.
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            PipelineStatus::Running
                | PipelineStatus::Success
                | PipelineStatus::Failed
                | PipelineStatus::Canceled
                | PipelineStatus::Skipped
                | PipelineStatus::Manual
        )
    }

    pub fn is_running(&self) -> bool {
        matches!(self, PipelineStatus::Running)
    }
}

impl From<String> for PipelineStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "running" => PipelineStatus::Running,
            "success" => PipelineStatus::Success,
            "failed" => PipelineStatus::Failed,
            "canceled" => PipelineStatus::Canceled,
            "skipped" => PipelineStatus::Skipped,
            "manual" => PipelineStatus::Manual,
            "pending" => PipelineStatus::Pending,
            _ => PipelineStatus::Other(raw),
        }
    }
}

impl From<&str> for PipelineStatus {
    fn from(raw: &str) -> Self {
        PipelineStatus::from(raw.to_string())
    }
}

impl From<PipelineStatus> for String {
    fn from(status: PipelineStatus) -> Self {
        match status {
            PipelineStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CI run on the source platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Branch (or tag) the pipeline ran on.
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
    pub status: PipelineStatus,
    pub web_url: String,
}

impl Pipeline {
    pub fn new(
        ref_name: impl Into<String>,
        sha: impl Into<String>,
        status: impl Into<PipelineStatus>,
        web_url: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            ref_name: ref_name.into(),
            sha: sha.into(),
            status: status.into(),
            web_url: web_url.into(),
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }
}

/// Entry of a project search on the source platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path_with_namespace: Option<String>,
}

impl ProjectSummary {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            name: None,
            path_with_namespace: None,
        }
    }
}

/// Pick the pipeline to report on from a listing, in listing order.
///
/// With a commit, the first pipeline built from that commit wins and must sit
/// on an accepted branch. Without one, the first pipeline on an accepted branch
/// with a reportable status wins.
pub fn select_pipeline(
    pipelines: &[Pipeline],
    branches: &[String],
    commit_sha: Option<&str>,
) -> Result<Pipeline> {
    match commit_sha {
        Some(sha) => select_by_commit(pipelines, branches, sha),
        None => select_by_branch(pipelines, branches),
    }
}

fn select_by_commit(pipelines: &[Pipeline], branches: &[String], sha: &str) -> Result<Pipeline> {
    let pipeline = pipelines
        .iter()
        .find(|p| p.sha == sha)
        .ok_or_else(|| RelayError::PipelineNotFound {
            criteria: format!("commit {sha}"),
        })?;

    if !branches.iter().any(|b| *b == pipeline.ref_name) {
        return Err(RelayError::BranchMismatch {
            sha: sha.to_string(),
            found: pipeline.ref_name.clone(),
            allowed: branches.to_vec(),
        });
    }

    Ok(pipeline.clone())
}

fn select_by_branch(pipelines: &[Pipeline], branches: &[String]) -> Result<Pipeline> {
    pipelines
        .iter()
        .find(|p| branches.iter().any(|b| *b == p.ref_name) && p.status.is_reportable())
        .cloned()
        .ok_or_else(|| RelayError::PipelineNotFound {
            criteria: format!("branches {branches:?}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branches(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_status_round_trips_known_and_unknown() {
        assert_eq!(PipelineStatus::from("failed"), PipelineStatus::Failed);
        assert_eq!(
            PipelineStatus::from("waiting_for_resource"),
            PipelineStatus::Other("waiting_for_resource".to_string())
        );
        assert_eq!(String::from(PipelineStatus::Canceled), "canceled");
        assert_eq!(
            String::from(PipelineStatus::Other("preparing".to_string())),
            "preparing"
        );
    }

    #[test]
    fn test_reportable_statuses() {
        for status in ["running", "success", "failed", "canceled", "skipped", "manual"] {
            assert!(PipelineStatus::from(status).is_reportable(), "{status}");
        }
        assert!(!PipelineStatus::Pending.is_reportable());
        assert!(!PipelineStatus::from("created").is_reportable());
    }

    #[test]
    fn test_pipeline_deserializes_platform_payload() {
        let payload = serde_json::json!({
            "id": 7,
            "iid": 3,
            "project_id": 42,
            "ref": "main",
            "sha": "abc123",
            "status": "success",
            "source": "push",
            "web_url": "https://gitlab.example.com/group/proj/-/pipelines/7"
        });
        let pipeline: Pipeline = serde_json::from_value(payload).unwrap();
        assert_eq!(pipeline.id, Some(7));
        assert_eq!(pipeline.ref_name, "main");
        assert_eq!(pipeline.status, PipelineStatus::Success);
    }

    #[test]
    fn test_commit_match_selects_first_matching_sha() {
        let pipelines = vec![
            Pipeline::new("main", "fff000", "success", "http://a").with_id(3),
            Pipeline::new("main", "abc123", "failed", "http://b").with_id(2),
            Pipeline::new("main", "abc123", "success", "http://c").with_id(1),
        ];
        let selected = select_pipeline(&pipelines, &branches(&["main"]), Some("abc123")).unwrap();
        assert_eq!(selected.id, Some(2));
        assert_eq!(selected.web_url, "http://b");
    }

    #[test]
    fn test_commit_match_without_match_is_not_found() {
        let pipelines = vec![Pipeline::new("main", "fff000", "success", "http://a")];
        let err = select_pipeline(&pipelines, &branches(&["main"]), Some("abc123")).unwrap_err();
        assert!(matches!(err, RelayError::PipelineNotFound { .. }));
    }

    #[test]
    fn test_commit_match_on_unexpected_branch_fails() {
        let pipelines = vec![Pipeline::new("feature", "abc123", "success", "http://a")];
        let allowed = branches(&["main", "develop"]);
        let err = select_pipeline(&pipelines, &allowed, Some("abc123")).unwrap_err();
        match err {
            RelayError::BranchMismatch { sha, found, allowed } => {
                assert_eq!(sha, "abc123");
                assert_eq!(found, "feature");
                assert_eq!(allowed, branches(&["main", "develop"]));
            }
            other => panic!("expected BranchMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_commit_match_ignores_status() {
        let pipelines = vec![Pipeline::new("main", "abc123", "pending", "http://a")];
        let selected = select_pipeline(&pipelines, &branches(&["main"]), Some("abc123")).unwrap();
        assert_eq!(selected.status, PipelineStatus::Pending);
    }

    #[test]
    fn test_branch_match_skips_unaccepted_branch_and_status() {
        let pipelines = vec![
            Pipeline::new("feature", "111", "success", "http://a"),
            Pipeline::new("main", "222", "pending", "http://b"),
            Pipeline::new("develop", "333", "failed", "http://c"),
            Pipeline::new("main", "444", "success", "http://d"),
        ];
        let selected = select_pipeline(&pipelines, &branches(&["main", "develop"]), None).unwrap();
        assert_eq!(selected.sha, "333");
    }

    #[test]
    fn test_branch_match_without_match_is_not_found() {
        let pipelines = vec![
            Pipeline::new("feature", "111", "success", "http://a"),
            Pipeline::new("main", "222", "pending", "http://b"),
        ];
        let err = select_pipeline(&pipelines, &branches(&["main"]), None).unwrap_err();
        assert!(matches!(err, RelayError::PipelineNotFound { .. }));
    }

    #[test]
    fn test_empty_listing_is_not_found() {
        let err = select_pipeline(&[], &branches(&["main"]), None).unwrap_err();
        assert!(matches!(err, RelayError::PipelineNotFound { .. }));
    }
}
