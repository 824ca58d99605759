//! Status-Relay: CI pipeline status relay
//!
//! Reads the status of a CI pipeline on a source platform (GitLab API) and
//! publishes it as a commit status on a target platform (GitHub API).
//!
//! ## Flow
//!
//! `resolve_project` → `find_pipeline` (re-polled while running) →
//! `map_status` → `publish_status`
//!
//! ## Key Components
//!
//! - `RelayConfig`: everything a run needs, built once by the caller
//! - `PipelineSource` / `StatusTarget`: platform seams, with HTTP clients
//!   (`GitLabClient`, `GitHubClient`) and in-memory fakes
//! - `run_relay`: one complete relay run

pub mod config;
mod error;
pub mod fakes;
pub mod github;
pub mod gitlab;
pub mod obs;
pub mod pipeline;
pub mod platform;
pub mod poll;
pub mod relay;
pub mod status;
pub mod telemetry;

pub use config::{parse_branch_list, PollPolicy, RelayConfig, RepoSlug};
pub use error::RelayError;
pub use github::GitHubClient;
pub use gitlab::GitLabClient;
pub use pipeline::{select_pipeline, Pipeline, PipelineStatus, ProjectSummary};
pub use platform::{PipelineSource, StatusTarget};
pub use poll::poll_until_settled;
pub use relay::{find_pipeline, publish_status, resolve_project, run_relay, RelayOutcome};
pub use status::{map_status, CommitState, PublishOutcome, StatusReport};
pub use telemetry::init_tracing;

/// Result type for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;
