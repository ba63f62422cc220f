//! Provider error types.

use thiserror::Error;

/// Errors that can occur when talking to a model endpoint.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The endpoint answered with a non-success status.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// Credentials were rejected (HTTP 401/403).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The endpoint returned HTTP 429.
    #[error("rate limited: retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The requested model does not exist on the endpoint.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The provider cannot be built from its configuration.
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// The endpoint returned a body that could not be parsed.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("timeout")]
    Timeout,

    #[error("http error: {0}")]
    Http(reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Http(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
