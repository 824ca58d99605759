//! Structured tracing events for the relay run lifecycle.
//!
//! Events are emitted at `info!` (rejections at `warn!`) inside a run-scoped
//! span. Tokens never appear in any event.

use tracing::info;

use crate::pipeline::Pipeline;
use crate::status::StatusReport;

/// RAII guard that enters a run-scoped tracing span for the duration of a relay run.
pub struct RelaySpan {
    _span: tracing::span::EnteredSpan,
}

impl RelaySpan {
    /// Create and enter a span tagged with the run id.
    pub fn enter(run_id: &str) -> Self {
        let span = tracing::info_span!("status_relay.run", run_id = %run_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: relay started for a source/target pair.
pub fn emit_relay_started(source_repo: &str, target_repo: &str, commit_sha: Option<&str>) {
    info!(
        event = "relay.started",
        source_repo = %source_repo,
        target_repo = %target_repo,
        commit_sha = commit_sha.unwrap_or("<latest>"),
    );
}

/// Emit event: source project resolved.
pub fn emit_project_resolved(search: &str, project_id: u64) {
    info!(event = "relay.project_resolved", search = %search, project_id = project_id);
}

/// Emit event: a pipeline was selected.
pub fn emit_pipeline_selected(pipeline: &Pipeline) {
    info!(
        event = "relay.pipeline_selected",
        sha = %pipeline.sha,
        branch = %pipeline.ref_name,
        status = %pipeline.status,
        "Found {} on branch {} with status '{}'",
        pipeline.sha,
        pipeline.ref_name,
        pipeline.status,
    );
}

/// Emit event: status accepted by the target platform.
pub fn emit_status_published(sha: &str, report: &StatusReport) {
    info!(
        event = "relay.published",
        sha = %sha,
        state = %report.state,
        context = %report.context,
    );
}

/// Emit event: status refused by the target platform (warning level).
pub fn emit_publish_rejected(sha: &str, status: u16, body: &str) {
    tracing::warn!(event = "relay.publish_rejected", sha = %sha, status = status, body = %body);
}
