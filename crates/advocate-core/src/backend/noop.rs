//! Degraded-mode backend.
//!
//! Makes no external calls and never runs a unit's body. The three
//! well-known conversation units get curated payloads; everything else is
//! synthesized from its output schema. Never returns an error.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::{Backend, BackendMode};
use crate::error::FlowError;
use crate::flows::names;
use crate::registry::Unit;
use crate::synth::{DISABLED_MESSAGE, synthesize_or_fallback};

/// Backend used when no model credential is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpBackend;

impl NoOpBackend {
    /// Placeholder for `unit`, curated when the name is well known.
    pub fn placeholder(unit: &Unit) -> Value {
        if let Some(value) = curated(unit.name()) {
            if unit.output_schema().validate(&value).is_ok() {
                return value;
            }
            debug!(unit = %unit.name(), "curated placeholder does not fit declared schema, synthesizing");
        }
        synthesize_or_fallback(unit.name(), unit.output_schema())
    }
}

fn curated(name: &str) -> Option<Value> {
    match name {
        names::GENERATE_RESPONSE_FLOW | names::GENERATE_RESPONSE_PROMPT => Some(json!({
            "response": format!("{DISABLED_MESSAGE} (NoOp for {name})"),
        })),
        names::INTERPRET_COMMAND_FLOW | names::INTERPRET_COMMAND_PROMPT => Some(json!({
            "action": "unknown",
            "parameters": {},
            "confidence": 0,
        })),
        names::SUMMARIZE_PAGE_FLOW | names::SUMMARIZE_PAGE_PROMPT => Some(json!({
            "summary": format!("{DISABLED_MESSAGE} (NoOp for {name})"),
        })),
        _ => None,
    }
}

#[async_trait]
impl Backend for NoOpBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::NoOp
    }

    fn on_define(&self, unit: &Unit) {
        warn!(
            unit = %unit.name(),
            kind = %unit.kind(),
            "defined without a model backend; AI logic will not be executed"
        );
    }

    async fn run(&self, unit: &Unit, _input: Value) -> Result<Value, FlowError> {
        Ok(Self::placeholder(unit))
    }
}
