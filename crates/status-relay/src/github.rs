//! GitHub commit status target

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::{RelayConfig, RepoSlug};
use crate::platform::StatusTarget;
use crate::status::{PublishOutcome, StatusReport};
use crate::Result;

const USER_AGENT: &str = concat!("status-relay/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the target status platform.
pub struct GitHubClient {
    api_base: String,
    token: String,
    http_client: reqwest::Client,
}

impl GitHubClient {
    /// Create a client for `api_base` (e.g. `https://api.github.com`).
    pub fn new(api_base: &str, token: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(GitHubClient {
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            http_client,
        })
    }

    /// Create the client described by a relay configuration.
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        Self::new(&config.target_api, &config.target_token)
    }

    fn statuses_url(&self, repo: &RepoSlug, sha: &str) -> String {
        format!(
            "{}/repos/{}/{}/statuses/{}",
            self.api_base, repo.owner, repo.repo, sha
        )
    }
}

#[async_trait]
impl StatusTarget for GitHubClient {
    async fn create_status(
        &self,
        repo: &RepoSlug,
        sha: &str,
        report: &StatusReport,
    ) -> Result<PublishOutcome> {
        let url = self.statuses_url(repo, sha);
        debug!(url = %url, state = %report.state, "POST");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .json(report)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CREATED {
            return Ok(PublishOutcome::Created);
        }

        let body = response.text().await?;
        Ok(PublishOutcome::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
