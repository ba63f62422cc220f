//! Model-backed backend.
//!
//! Prompts are rendered with minijinja, sent to the configured
//! [`Provider`] with an instruction to answer in JSON, and the reply is
//! parsed and validated against the prompt's output schema. Flows run
//! their body and have its result validated the same way.

use advocate_llm::{ChatMessage, ChatRequest, Provider};
use async_trait::async_trait;
use minijinja::Environment;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Backend, BackendMode};
use crate::error::FlowError;
use crate::extract::extract_json_object;
use crate::registry::{PromptTemplate, Unit, UnitBody};

/// Backend calling an OpenAI-compatible model endpoint.
pub struct LiveBackend {
    provider: Box<dyn Provider>,
    model: String,
    templates: Environment<'static>,
}

impl LiveBackend {
    pub fn new(provider: Box<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            templates: Environment::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    fn build_request(
        &self,
        unit: &Unit,
        template: &PromptTemplate,
        input: &Value,
    ) -> Result<ChatRequest, FlowError> {
        let text = self
            .templates
            .render_str(&template.source, input)
            .map_err(|e| FlowError::Template {
                unit: unit.name().to_string(),
                reason: e.to_string(),
            })?;

        let schema = serde_json::to_string_pretty(&unit.output_schema().to_json_schema())?;
        let instruction = format!(
            "Answer with a single JSON object and nothing else. \
             It must conform to this JSON Schema:\n{schema}"
        );

        let media = template
            .media_field
            .as_deref()
            .and_then(|field| input.get(field))
            .and_then(Value::as_str)
            .filter(|uri| uri.starts_with("data:"));

        let user = match media {
            Some(uri) => ChatMessage::user_with_media(text, uri),
            None => ChatMessage::user(text),
        };

        Ok(ChatRequest::new(&self.model, vec![ChatMessage::system(instruction), user]).with_json_output())
    }

    async fn run_prompt(
        &self,
        unit: &Unit,
        template: &PromptTemplate,
        input: Value,
    ) -> Result<Value, FlowError> {
        let request = self.build_request(unit, template, &input)?;
        let response = self.provider.complete(&request).await?;

        let Some(text) = response.text() else {
            warn!(unit = %unit.name(), "model returned no content");
            return Err(FlowError::EmptyOutput {
                unit: unit.name().to_string(),
            });
        };

        let value = extract_json_object(text)?;
        let parsed = unit.output_schema().parse(value).inspect_err(|e| {
            warn!(unit = %unit.name(), error = %e, "model output failed validation");
        })?;
        Ok(parsed)
    }
}

#[async_trait]
impl Backend for LiveBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::Live
    }

    fn on_define(&self, unit: &Unit) {
        if let UnitBody::Prompt(template) = &unit.body {
            if let Err(e) = Environment::new().template_from_str(&template.source) {
                warn!(unit = %unit.name(), error = %e, "prompt template does not compile");
            }
        }
        debug!(unit = %unit.name(), kind = %unit.kind(), model = %self.model, "defined");
    }

    async fn run(&self, unit: &Unit, input: Value) -> Result<Value, FlowError> {
        match &unit.body {
            UnitBody::Prompt(template) => self.run_prompt(unit, template, input).await,
            UnitBody::Flow(body) => {
                let output = body.run(input).await?;
                Ok(unit.output_schema().parse(output)?)
            }
        }
    }
}
