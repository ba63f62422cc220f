//! Placeholder synthesis for degraded mode.
//!
//! When no model backend is configured, every unit still has to return a
//! value that conforms to its output schema. [`synthesize`] builds one,
//! filling human-readable strings with [`DISABLED_MESSAGE`] so the user
//! sees why nothing intelligent came back.

use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::warn;

use crate::schema::{ObjectSchema, Schema};

/// Diagnostic sentence carried by every degraded-mode string.
pub const DISABLED_MESSAGE: &str =
    "AI functionality is currently disabled. Please configure the API key in your .env file.";

/// The top-level schema has no conformant placeholder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot synthesize a placeholder for a top-level {shape} schema")]
pub struct SynthesisError {
    pub shape: String,
}

/// Build a placeholder conforming to `schema`.
///
/// Only object and string schemas are supported at the top level. Inside
/// objects every shape is handled: optionals become `null`, numbers `0`,
/// booleans `false`, nested objects recurse, and unknown shapes get a
/// string naming the unsupported type.
pub fn synthesize(schema: &Schema) -> Result<Value, SynthesisError> {
    match schema {
        Schema::String => Ok(Value::String(DISABLED_MESSAGE.to_string())),
        Schema::Object(obj) => Ok(synthesize_object(obj)),
        other => Err(SynthesisError {
            shape: other.kind_name().to_string(),
        }),
    }
}

/// The generic `{response, error: true}` object used when no typed
/// placeholder can be produced.
pub fn fallback_value() -> Value {
    json!({ "response": DISABLED_MESSAGE, "error": true })
}

/// [`synthesize`], converting any failure into [`fallback_value`].
pub fn synthesize_or_fallback(unit: &str, schema: &Schema) -> Value {
    match synthesize(schema) {
        Ok(value) => value,
        Err(e) => {
            warn!(unit = %unit, error = %e, "using generic degraded-mode fallback");
            fallback_value()
        }
    }
}

fn synthesize_object(obj: &ObjectSchema) -> Value {
    let mut map = Map::new();
    for field in obj.fields() {
        map.insert(field.name.clone(), synthesize_field(&field.name, &field.schema));
    }
    Value::Object(map)
}

fn synthesize_field(name: &str, schema: &Schema) -> Value {
    match schema {
        Schema::String => Value::String(format!("{DISABLED_MESSAGE} (field: {name})")),
        Schema::Number => json!(0),
        Schema::Boolean => Value::Bool(false),
        Schema::Optional(_) => Value::Null,
        Schema::Object(obj) => synthesize_object(obj),
        Schema::Unknown(label) => Value::String(format!(
            "{DISABLED_MESSAGE} (field: {name}, unsupported type: {label})"
        )),
    }
}
