//! # advocate-types
//!
//! Core type definitions shared by every advocate crate.
//!
//! This crate sits at the bottom of the dependency graph. It contains:
//!
//! - **[`error`]** -- [`AdvocateError`], the top-level error type
//! - **[`config`]** -- Configuration schema (backend, session, storage)
//! - **[`command`]** -- User-defined phrase-to-URL shortcuts
//! - **[`message`]** -- Conversation transcript entries
//! - **[`language`]** -- Supported response languages
//! - **[`media`]** -- Validated media attachments (data URIs)
//! - **[`secret`]** -- [`SecretString`](secret::SecretString) for credentials

pub mod command;
pub mod config;
pub mod error;
pub mod language;
pub mod media;
pub mod message;
pub mod secret;

pub use error::{AdvocateError, Result};
