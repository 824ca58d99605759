//! GitLab pipeline source
//!
//! Reads projects and pipelines through the GitLab REST API (v4), authenticated
//! with a private token.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::pipeline::{Pipeline, ProjectSummary};
use crate::platform::PipelineSource;
use crate::Result;

const USER_AGENT: &str = concat!("status-relay/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the source pipeline platform.
pub struct GitLabClient {
    api_base: String,
    token: String,
    http_client: reqwest::Client,
}

impl GitLabClient {
    /// Create a client for `api_base` (e.g. `https://gitlab.com/api/v4`).
    pub fn new(api_base: &str, token: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(GitLabClient {
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            http_client,
        })
    }

    /// Create the client described by a relay configuration.
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        Self::new(&config.source_api, &config.source_token)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.api_base, path);
        debug!(url = %url, "GET");

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RelayError::UnexpectedResponse {
                endpoint: format!("GET {path}"),
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl PipelineSource for GitLabClient {
    async fn search_projects(&self, term: &str) -> Result<Vec<ProjectSummary>> {
        self.get_json("/projects", &[("search", term)]).await
    }

    async fn list_pipelines(&self, project_id: u64) -> Result<Vec<Pipeline>> {
        self.get_json(&format!("/projects/{project_id}/pipelines"), &[])
            .await
    }
}
