//! Error types for status-relay

use thiserror::Error;

/// Errors that can abort a relay run
#[derive(Error, Debug)]
pub enum RelayError {
    /// Missing or malformed setting
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Project search returned no results
    #[error("No project found matching search term '{search}'")]
    ProjectNotFound { search: String },

    /// No pipeline satisfied the selection criteria
    #[error("Could not find a pipeline for {criteria}")]
    PipelineNotFound { criteria: String },

    /// The pipeline for the commit ran on a branch outside the allow-list
    #[error("Commit {sha} was built on branch '{found}', expected one of {allowed:?}")]
    BranchMismatch {
        sha: String,
        found: String,
        allowed: Vec<String>,
    },

    /// The platform answered with an unexpected status code
    #[error("{endpoint} returned HTTP {status}: {body}")]
    UnexpectedResponse {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON decoding error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::Http(err.to_string())
    }
}
