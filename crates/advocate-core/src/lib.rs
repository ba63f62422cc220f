//! # advocate-core
//!
//! Flow orchestration and degraded-mode runtime for the advocate
//! conversational assistant.
//!
//! - **[`schema`]** -- declarative shapes for unit inputs and outputs
//! - **[`synth`]** -- schema-driven placeholder values
//! - **[`backend`]** -- the live and degraded backends and their selector
//! - **[`registry`]** -- flow/prompt definitions and the [`Invoker`](registry::Invoker)
//! - **[`flows`]** -- the three conversation units and their typed wrappers
//! - **[`resolve`]** -- custom command resolution
//! - **[`preferences`]** -- persisted language and custom commands
//! - **[`orchestrator`]** -- the per-session conversation state machine
//! - **[`bootstrap`]** -- wiring everything from a [`Config`](advocate_types::config::Config)

pub mod backend;
pub mod bootstrap;
pub mod error;
pub mod extract;
pub mod flows;
pub mod orchestrator;
pub mod preferences;
pub mod redact;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod synth;

pub use backend::{Backend, BackendMode};
pub use error::{FlowError, RegistryError};
pub use flows::{AiFlows, ConversationAi};
pub use orchestrator::{Orchestrator, TurnOutcome};
