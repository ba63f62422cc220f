//! Error types for flow definition and invocation.

use advocate_llm::ProviderError;
use thiserror::Error;

use crate::schema::ValidationError;

/// A unit invocation failed.
///
/// Only the live backend produces these; the degraded backend never fails.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("model call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("output did not match schema: {0}")]
    Validation(#[from] ValidationError),

    #[error("model returned no output for '{unit}'")]
    EmptyOutput { unit: String },

    #[error("template error in '{unit}': {reason}")]
    Template { unit: String, reason: String },

    #[error("model output is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("'{unit}' did not finish within {secs}s")]
    Timeout { unit: String, secs: u64 },
}

/// Unit definition failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a flow or prompt named '{0}' is already defined")]
    DuplicateName(String),
}
