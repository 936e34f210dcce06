//! Admin client error type.

use thiserror::Error;

/// Errors that can occur when talking to the admin endpoints.
#[derive(Debug, Error)]
pub enum AdminError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend reported a failure.
    #[error("rejected by backend: {0}")]
    Rejected(String),

    /// Endpoint URL could not be built from the configured base.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}
