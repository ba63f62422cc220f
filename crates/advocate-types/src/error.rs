//! Error types for the advocate workspace.
//!
//! [`AdvocateError`] covers failures that are not specific to the model
//! transport or the flow runtime: configuration, storage, and I/O.

use thiserror::Error;

/// Top-level error type for configuration and storage concerns.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AdvocateError {
    /// Configuration is malformed or semantically invalid.
    #[error("invalid config: {reason}")]
    ConfigInvalid {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// The persisted key-value store could not be read or written.
    #[error("storage error: {reason}")]
    Storage {
        /// What went wrong.
        reason: String,
    },

    /// A user-supplied custom command was rejected.
    #[error("invalid command: {reason}")]
    InvalidCommand {
        /// Why the command was rejected.
        reason: String,
    },

    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, AdvocateError>;
