//! Status-Relay CLI
//!
//! The `status-relay` command reports the status of a GitLab CI pipeline as a
//! GitHub commit status. Every setting can be given as a flag or through the
//! environment variables a GitLab trigger job receives.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use uuid::Uuid;

use status_relay::config::{DEFAULT_SOURCE_API, DEFAULT_TARGET_API};
use status_relay::obs::RelaySpan;
use status_relay::{
    init_tracing, parse_branch_list, run_relay, GitHubClient, GitLabClient, PollPolicy,
    PublishOutcome, RelayConfig,
};

#[derive(Parser, Debug)]
#[command(name = "status-relay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Relay a GitLab pipeline status to a GitHub commit status", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    /// Repository whose pipelines are read (URL or group/name)
    #[arg(long, env = "GITLAB_TARGET_REPO")]
    source_repo: String,

    /// Comma separated list of accepted source branches
    #[arg(long, env = "GITHUB_SOURCE_BRANCH")]
    branches: String,

    /// Repository the status is published to (URL or owner/repo)
    #[arg(long, env = "GITHUB_SOURCE_REPO")]
    target_repo: String,

    /// Private token for the source platform
    #[arg(long, env = "STATUS_SOURCE_PAT", hide_env_values = true)]
    source_token: String,

    /// Token for the target platform
    #[arg(long, env = "STATUS_TARGET_PAT", hide_env_values = true)]
    target_token: String,

    /// Status context label
    #[arg(long, env = "GITLAB_STATUS_CONTEXT")]
    context: String,

    /// Commit to report on (default: first pipeline on an accepted branch)
    #[arg(long, env = "GITHUB_SHA")]
    sha: Option<String>,

    /// Source platform API base URL
    #[arg(long, env = "STATUS_SOURCE_API", default_value = DEFAULT_SOURCE_API)]
    source_api: String,

    /// Target platform API base URL
    #[arg(long, env = "STATUS_TARGET_API", default_value = DEFAULT_TARGET_API)]
    target_api: String,

    /// Maximum pipeline lookups while the pipeline is running
    #[arg(long, env = "STATUS_POLL_ATTEMPTS", default_value = "10")]
    poll_attempts: u32,

    /// Seconds to wait between two lookups of a running pipeline
    #[arg(long, env = "STATUS_POLL_INTERVAL_SECS", default_value = "10")]
    poll_interval_secs: u64,
}

impl Cli {
    fn into_config(self) -> Result<RelayConfig> {
        let config = RelayConfig {
            source_repo: self.source_repo,
            target_repo: self.target_repo,
            branches: parse_branch_list(&self.branches)?,
            source_token: self.source_token,
            target_token: self.target_token,
            context: self.context,
            commit_sha: self.sha.filter(|sha| !sha.trim().is_empty()),
            source_api: self.source_api,
            target_api: self.target_api,
            poll: PollPolicy::new(
                self.poll_attempts,
                Duration::from_secs(self.poll_interval_secs),
            ),
        };
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let config = cli.into_config().context("Invalid relay configuration")?;
    let run_id = Uuid::new_v4().to_string();
    let _span = RelaySpan::enter(&run_id);

    let source =
        GitLabClient::from_config(&config).context("Failed to create source platform client")?;
    let target =
        GitHubClient::from_config(&config).context("Failed to create target platform client")?;

    let outcome = run_relay(&config, &source, &target)
        .await
        .context("Status relay failed")?;

    match outcome.publish {
        PublishOutcome::Created => {
            info!(
                "Reported '{}' for {} on {}",
                outcome.report.state, outcome.pipeline.sha, config.target_repo
            );
            Ok(ExitCode::SUCCESS)
        }
        PublishOutcome::Rejected { body, .. } => {
            println!("{body}");
            Ok(ExitCode::FAILURE)
        }
    }
}
