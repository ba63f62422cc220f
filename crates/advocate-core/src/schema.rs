//! Value shapes for flow and prompt contracts.
//!
//! A [`Schema`] describes the JSON value a flow or prompt accepts or
//! returns. It is declared next to each unit and never executed; it drives
//! output validation on the live backend, placeholder synthesis on the
//! degraded backend, and the JSON Schema shown to the model.

use std::fmt;

use serde_json::{Map, Value, json};
use thiserror::Error;

/// Shape of a JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String,
    Number,
    Boolean,
    Object(ObjectSchema),
    /// `null` or absent, otherwise the inner shape.
    Optional(Box<Schema>),
    /// A shape this model does not describe (arrays, enums, unions, ...).
    /// The label names it. Any value is accepted.
    Unknown(String),
}

/// A named field of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
    pub description: Option<String>,
}

/// Object shape with ordered, named fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    fields: Vec<Field>,
    passthrough: bool,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field. A later field with the same name replaces the earlier one.
    pub fn field(self, name: impl Into<String>, schema: Schema) -> Self {
        self.push(name.into(), schema, None)
    }

    /// Add a field with a description shown to the model.
    pub fn described(self, name: impl Into<String>, schema: Schema, description: &str) -> Self {
        self.push(name.into(), schema, Some(description.to_string()))
    }

    /// Keep keys that no field declares when parsing.
    pub fn passthrough(mut self) -> Self {
        self.passthrough = true;
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn is_passthrough(&self) -> bool {
        self.passthrough
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.schema)
    }

    fn push(mut self, name: String, schema: Schema, description: Option<String>) -> Self {
        self.fields.retain(|f| f.name != name);
        self.fields.push(Field {
            name,
            schema,
            description,
        });
        self
    }
}

impl From<ObjectSchema> for Schema {
    fn from(obj: ObjectSchema) -> Self {
        Schema::Object(obj)
    }
}

/// A value did not match its schema.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("at `{path}`: expected {expected}, found {found}")]
pub struct ValidationError {
    /// JSON-pointer-like path of the offending value (`$` is the root).
    pub path: String,
    pub expected: String,
    pub found: String,
}

impl Schema {
    pub fn optional(inner: Schema) -> Self {
        Schema::Optional(Box::new(inner))
    }

    /// Short name of the shape, used in diagnostics.
    pub fn kind_name(&self) -> &str {
        match self {
            Schema::String => "string",
            Schema::Number => "number",
            Schema::Boolean => "boolean",
            Schema::Object(_) => "object",
            Schema::Optional(_) => "optional",
            Schema::Unknown(label) => label.as_str(),
        }
    }

    /// Check `value` against this schema.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        self.check(value, "$")
    }

    /// Validate and normalize `value`.
    ///
    /// Undeclared keys are dropped from non-passthrough objects, and absent
    /// or `null` optional fields are omitted.
    pub fn parse(&self, value: Value) -> Result<Value, ValidationError> {
        self.check(&value, "$")?;
        Ok(self.normalize(value))
    }

    fn check(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        let ok = match self {
            Schema::String => value.is_string(),
            Schema::Number => value.is_number(),
            Schema::Boolean => value.is_boolean(),
            Schema::Unknown(_) => true,
            Schema::Optional(inner) => {
                return if value.is_null() {
                    Ok(())
                } else {
                    inner.check(value, path)
                };
            }
            Schema::Object(obj) => {
                let Some(map) = value.as_object() else {
                    return Err(mismatch(path, self, value));
                };
                for field in &obj.fields {
                    let child = map.get(&field.name).unwrap_or(&Value::Null);
                    field
                        .schema
                        .check(child, &format!("{path}.{}", field.name))?;
                }
                true
            }
        };
        if ok {
            Ok(())
        } else {
            Err(mismatch(path, self, value))
        }
    }

    fn normalize(&self, value: Value) -> Value {
        match (self, value) {
            (Schema::Optional(inner), v) if !v.is_null() => inner.normalize(v),
            (Schema::Object(obj), Value::Object(mut map)) => {
                let mut out = Map::new();
                for field in &obj.fields {
                    match map.remove(&field.name) {
                        Some(Value::Null) | None => {}
                        Some(v) => {
                            out.insert(field.name.clone(), field.schema.normalize(v));
                        }
                    }
                }
                if obj.passthrough {
                    out.extend(map);
                }
                Value::Object(out)
            }
            (_, v) => v,
        }
    }

    /// Render as a JSON Schema document for model instructions.
    pub fn to_json_schema(&self) -> Value {
        match self {
            Schema::String => json!({"type": "string"}),
            Schema::Number => json!({"type": "number"}),
            Schema::Boolean => json!({"type": "boolean"}),
            Schema::Unknown(label) => json!({"description": format!("any value ({label})")}),
            Schema::Optional(inner) => json!({"anyOf": [inner.to_json_schema(), {"type": "null"}]}),
            Schema::Object(obj) => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for field in &obj.fields {
                    let (schema, is_optional) = match &field.schema {
                        Schema::Optional(inner) => (inner.to_json_schema(), true),
                        other => (other.to_json_schema(), false),
                    };
                    let mut schema = schema;
                    if let (Some(desc), Value::Object(m)) = (&field.description, &mut schema) {
                        m.insert("description".into(), Value::String(desc.clone()));
                    }
                    properties.insert(field.name.clone(), schema);
                    if !is_optional {
                        required.push(Value::String(field.name.clone()));
                    }
                }
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                    "additionalProperties": obj.passthrough,
                })
            }
        }
    }

    /// Build a schema from a JSON Schema fragment, tolerating missing or
    /// unsupported metadata.
    ///
    /// Fragments without a recognizable `type` become [`Schema::Unknown`]
    /// rather than errors, so a partially specified contract still yields a
    /// usable schema.
    pub fn from_json_schema(doc: &Value) -> Schema {
        if let Some(any_of) = doc.get("anyOf").and_then(Value::as_array) {
            let non_null: Vec<&Value> = any_of
                .iter()
                .filter(|v| v.get("type").and_then(Value::as_str) != Some("null"))
                .collect();
            return match non_null.as_slice() {
                [single] if non_null.len() < any_of.len() => {
                    Schema::optional(Schema::from_json_schema(single))
                }
                _ => Schema::Unknown("union".into()),
            };
        }
        if doc.get("enum").is_some() {
            return Schema::Unknown("enum".into());
        }

        match doc.get("type").and_then(Value::as_str) {
            Some("string") => Schema::String,
            Some("number") | Some("integer") => Schema::Number,
            Some("boolean") => Schema::Boolean,
            Some("array") => Schema::Unknown("array".into()),
            Some("object") => {
                let required: Vec<&str> = doc
                    .get("required")
                    .and_then(Value::as_array)
                    .map(|r| r.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();
                let mut obj = ObjectSchema::new();
                if let Some(props) = doc.get("properties").and_then(Value::as_object) {
                    for (name, prop) in props {
                        let mut schema = Schema::from_json_schema(prop);
                        if !required.contains(&name.as_str()) && !matches!(schema, Schema::Optional(_)) {
                            schema = Schema::optional(schema);
                        }
                        obj = match prop.get("description").and_then(Value::as_str) {
                            Some(desc) => obj.described(name.clone(), schema, desc),
                            None => obj.field(name.clone(), schema),
                        };
                    }
                }
                if doc.get("additionalProperties") == Some(&Value::Bool(true)) {
                    obj = obj.passthrough();
                }
                Schema::Object(obj)
            }
            Some(other) => Schema::Unknown(other.to_string()),
            None => Schema::Unknown("unspecified".into()),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Optional(inner) => write!(f, "optional {inner}"),
            other => f.write_str(other.kind_name()),
        }
    }
}

fn mismatch(path: &str, schema: &Schema, value: &Value) -> ValidationError {
    ValidationError {
        path: path.to_string(),
        expected: schema.to_string(),
        found: json_kind(value).to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
