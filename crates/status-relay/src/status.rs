//! Commit statuses on the target platform.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pipeline::{Pipeline, PipelineStatus};

/// Commit status state understood by the target platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitState {
    Pending,
    Success,
    Failure,
    Error,
}

impl CommitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitState::Pending => "pending",
            CommitState::Success => "success",
            CommitState::Failure => "failure",
            CommitState::Error => "error",
        }
    }
}

impl fmt::Display for CommitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translate a native pipeline status. Anything without a direct counterpart is an error.
pub fn map_status(status: &PipelineStatus) -> CommitState {
    match status {
        PipelineStatus::Running => CommitState::Pending,
        PipelineStatus::Success => CommitState::Success,
        PipelineStatus::Failed => CommitState::Failure,
        PipelineStatus::Canceled | PipelineStatus::Skipped | PipelineStatus::Manual => {
            CommitState::Error
        }
        PipelineStatus::Pending | PipelineStatus::Other(_) => CommitState::Error,
    }
}

/// Body of a commit status request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub state: CommitState,
    pub target_url: String,
    pub context: String,
}

impl StatusReport {
    /// Build the report for a pipeline under the given status context.
    pub fn from_pipeline(pipeline: &Pipeline, context: &str) -> Self {
        Self {
            state: map_status(&pipeline.status),
            target_url: pipeline.web_url.clone(),
            context: context.to_string(),
        }
    }
}

/// What the target platform answered to a status request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The status was recorded.
    Created,
    /// Any answer other than "created".
    Rejected { status: u16, body: String },
}

impl PublishOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, PublishOutcome::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_status_table() {
        let table = [
            ("running", CommitState::Pending),
            ("success", CommitState::Success),
            ("failed", CommitState::Failure),
            ("canceled", CommitState::Error),
            ("skipped", CommitState::Error),
            ("manual", CommitState::Error),
        ];
        for (native, expected) in table {
            assert_eq!(map_status(&PipelineStatus::from(native)), expected, "{native}");
        }
    }

    #[test]
    fn test_map_status_defaults_to_error() {
        for native in ["pending", "created", "scheduled", "", "SUCCESS"] {
            assert_eq!(
                map_status(&PipelineStatus::from(native)),
                CommitState::Error,
                "{native}"
            );
        }
    }

    #[test]
    fn test_report_serializes_as_status_body() {
        let pipeline = Pipeline::new("main", "abc123", "failed", "http://x");
        let report = StatusReport::from_pipeline(&pipeline, "nersc-ci");
        let body = serde_json::to_value(&report).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "state": "failure",
                "target_url": "http://x",
                "context": "nersc-ci"
            })
        );
    }

    #[test]
    fn test_only_created_counts_as_created() {
        let outcome = PublishOutcome::Rejected {
            status: 422,
            body: "Validation Failed".to_string(),
        };
        assert!(!outcome.is_created());
        assert!(PublishOutcome::Created.is_created());
    }
}
