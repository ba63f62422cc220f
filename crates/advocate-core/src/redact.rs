//! Log-safe views of unit inputs.
//!
//! Inputs can carry whole media files and, in principle, credentials. The
//! invoker logs [`redacted`] instead of the raw value.

use serde_json::{Map, Value};

/// Strings longer than this are truncated.
pub const MAX_LOGGED_CHARS: usize = 256;

const SECRET_KEYS: &[&str] = &["apikey", "api_key", "token", "password", "secret"];

/// Copy of `value` safe to write to logs.
///
/// - data URIs keep their MIME header and lose the payload;
/// - long strings are cut at [`MAX_LOGGED_CHARS`];
/// - values under secret-looking keys are replaced.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(redact_str(s)),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, val) in map {
                let redacted = if is_secret_key(key) {
                    Value::String("[REDACTED]".into())
                } else {
                    redact(val)
                };
                out.insert(key.clone(), redacted);
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

/// [`redact`] rendered as compact JSON.
pub fn redacted(value: &Value) -> String {
    redact(value).to_string()
}

fn redact_str(s: &str) -> String {
    if let Some(rest) = s.strip_prefix("data:") {
        if let Some((header, payload)) = rest.split_once(',') {
            return format!("data:{header},[REDACTED {} bytes]", payload.len());
        }
    }
    if s.chars().count() > MAX_LOGGED_CHARS {
        let head: String = s.chars().take(MAX_LOGGED_CHARS).collect();
        return format!("{head}...[truncated]");
    }
    s.to_string()
}

fn is_secret_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    SECRET_KEYS.iter().any(|s| lower == *s || lower.ends_with(&format!("_{s}")))
}
