//! Flow and prompt registry.
//!
//! A *unit* is a named piece of AI-backed work with an input and output
//! [`Schema`]. Prompts carry a text template the live backend renders and
//! sends to the model; flows carry a Rust body (usually calling a prompt).
//! [`FlowRegistry`] binds every unit to the backend chosen at startup and
//! hands back an [`Invoker`]. Callers never see which backend runs.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::backend::{Backend, BackendMode};
use crate::error::{FlowError, RegistryError};
use crate::redact::redacted;
use crate::schema::Schema;

/// Whether a unit is a flow or a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Flow,
    Prompt,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Flow => f.write_str("flow"),
            UnitKind::Prompt => f.write_str("prompt"),
        }
    }
}

/// Body of a flow: input value in, output value out.
///
/// Implemented for any `Fn(Value) -> impl Future<Output = Result<Value, FlowError>>`.
#[async_trait]
pub trait FlowBody: Send + Sync {
    async fn run(&self, input: Value) -> Result<Value, FlowError>;
}

#[async_trait]
impl<F, Fut> FlowBody for F
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, FlowError>> + Send + 'static,
{
    async fn run(&self, input: Value) -> Result<Value, FlowError> {
        (self)(input).await
    }
}

/// Template of a prompt unit.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// minijinja source rendered against the input value.
    pub source: String,
    /// Input field holding an optional media data URI sent alongside the text.
    pub media_field: Option<String>,
}

pub(crate) enum UnitBody {
    Flow(Arc<dyn FlowBody>),
    Prompt(PromptTemplate),
}

/// A defined unit, as seen by backends.
pub struct Unit {
    name: String,
    kind: UnitKind,
    input_schema: Schema,
    output_schema: Schema,
    pub(crate) body: UnitBody,
}

impl Unit {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    pub fn output_schema(&self) -> &Schema {
        &self.output_schema
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Declaration of a flow.
pub struct FlowSpec {
    pub name: String,
    pub input_schema: Schema,
    pub output_schema: Schema,
    pub body: Arc<dyn FlowBody>,
}

impl FlowSpec {
    pub fn new(
        name: impl Into<String>,
        input_schema: Schema,
        output_schema: Schema,
        body: impl FlowBody + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            input_schema,
            output_schema,
            body: Arc::new(body),
        }
    }
}

/// Declaration of a prompt.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    pub name: String,
    pub input_schema: Schema,
    pub output_schema: Schema,
    pub template: PromptTemplate,
}

impl PromptSpec {
    pub fn new(
        name: impl Into<String>,
        input_schema: Schema,
        output_schema: Schema,
        template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input_schema,
            output_schema,
            template: PromptTemplate {
                source: template.into(),
                media_field: None,
            },
        }
    }

    pub fn with_media_field(mut self, field: impl Into<String>) -> Self {
        self.template.media_field = Some(field.into());
        self
    }
}

/// Callable handle to a defined unit.
#[derive(Clone)]
pub struct Invoker {
    unit: Arc<Unit>,
    backend: Arc<dyn Backend>,
}

impl Invoker {
    pub fn name(&self) -> &str {
        self.unit.name()
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn mode(&self) -> BackendMode {
        self.backend.mode()
    }

    /// Run the unit on the active backend.
    ///
    /// The returned value conforms to the unit's output schema. In degraded
    /// mode this never fails and the unit's body is never executed.
    pub async fn invoke(&self, input: Value) -> Result<Value, FlowError> {
        let input_view = redacted(&input);
        match self.backend.mode() {
            BackendMode::NoOp => warn!(
                unit = %self.unit.name,
                kind = %self.unit.kind,
                input = %input_view,
                "called in degraded mode, returning placeholder"
            ),
            BackendMode::Live => info!(
                unit = %self.unit.name,
                kind = %self.unit.kind,
                input = %input_view,
                "invoking"
            ),
        }
        self.backend.run(&self.unit, input).await
    }
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invoker")
            .field("unit", &self.unit.name)
            .field("mode", &self.backend.mode())
            .finish()
    }
}

/// Registry binding units to the process-wide backend.
pub struct FlowRegistry {
    backend: Arc<dyn Backend>,
    defined: HashSet<String>,
}

impl FlowRegistry {
    /// The backend is chosen before the registry exists, so no unit can be
    /// invoked before selection has happened.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            defined: HashSet::new(),
        }
    }

    pub fn mode(&self) -> BackendMode {
        self.backend.mode()
    }

    /// Names of all defined units.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defined.iter().map(String::as_str)
    }

    pub fn define_flow(&mut self, spec: FlowSpec) -> Result<Invoker, RegistryError> {
        self.define(Unit {
            name: spec.name,
            kind: UnitKind::Flow,
            input_schema: spec.input_schema,
            output_schema: spec.output_schema,
            body: UnitBody::Flow(spec.body),
        })
    }

    pub fn define_prompt(&mut self, spec: PromptSpec) -> Result<Invoker, RegistryError> {
        self.define(Unit {
            name: spec.name,
            kind: UnitKind::Prompt,
            input_schema: spec.input_schema,
            output_schema: spec.output_schema,
            body: UnitBody::Prompt(spec.template),
        })
    }

    fn define(&mut self, unit: Unit) -> Result<Invoker, RegistryError> {
        if !self.defined.insert(unit.name.clone()) {
            return Err(RegistryError::DuplicateName(unit.name));
        }
        self.backend.on_define(&unit);
        Ok(Invoker {
            unit: Arc::new(unit),
            backend: Arc::clone(&self.backend),
        })
    }
}
