//! The three conversation units and their typed wrappers.
//!
//! Each contract is registered twice: a prompt that carries the template
//! and a flow that calls it. [`AiFlows`] holds the flow invokers and
//! converts between typed structs and JSON.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::error;

use crate::error::{FlowError, RegistryError};
use crate::registry::{FlowRegistry, FlowSpec, Invoker, PromptSpec};
use crate::schema::{ObjectSchema, Schema, ValidationError};

/// Registered unit names.
pub mod names {
    pub const INTERPRET_COMMAND_FLOW: &str = "interpretCommandFlow";
    pub const INTERPRET_COMMAND_PROMPT: &str = "interpretCommandPrompt";
    pub const GENERATE_RESPONSE_FLOW: &str = "generateResponseFromContextFlow";
    pub const GENERATE_RESPONSE_PROMPT: &str = "generateResponseFromContextPrompt";
    pub const SUMMARIZE_PAGE_FLOW: &str = "summarizePageContentFlow";
    pub const SUMMARIZE_PAGE_PROMPT: &str = "summarizePageContentPrompt";
}

/// Returned by the summarize flow when its prompt yields nothing.
pub const SUMMARY_UNAVAILABLE: &str =
    "I couldn't summarize the page content. The AI service didn't provide a valid response.";

/// Language used when a request does not name one.
pub const DEFAULT_LANGUAGE: &str = "en";

// ── Typed contracts ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretCommandInput {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Classified intent of an utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretationResult {
    pub action: String,
    /// Always present; may be empty.
    #[serde(default)]
    pub parameters: Map<String, Value>,
    pub confidence: f64,
}

impl InterpretationResult {
    /// The `matchedPhrase` parameter, when the model reported one.
    pub fn matched_phrase(&self) -> Option<&str> {
        self.parameters.get("matchedPhrase").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponseInput {
    pub context: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_data_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponseOutput {
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizePageInput {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizePageOutput {
    pub summary: String,
}

// ── Schemas ──────────────────────────────────────────────────────────────

pub fn interpret_command_input() -> Schema {
    ObjectSchema::new()
        .described("command", Schema::String, "The voice command to interpret.")
        .described(
            "context",
            Schema::optional(Schema::String),
            "JSON array of the user's custom commands.",
        )
        .into()
}

pub fn interpret_command_output() -> Schema {
    ObjectSchema::new()
        .described(
            "action",
            Schema::String,
            "Interpreted action, e.g. \"navigate\", \"search\", \"customAction\", \"unknown\".",
        )
        .described(
            "parameters",
            ObjectSchema::new()
                .described(
                    "matchedPhrase",
                    Schema::optional(Schema::String),
                    "The custom command phrase the utterance matched, exactly as registered.",
                )
                .passthrough()
                .into(),
            "Action parameters. Always an object, possibly empty.",
        )
        .described("confidence", Schema::Number, "Confidence of the interpretation, 0 to 1.")
        .into()
}

pub fn generate_response_input() -> Schema {
    ObjectSchema::new()
        .field("context", Schema::String)
        .field("query", Schema::String)
        .field("language", Schema::optional(Schema::String))
        .field("mediaDataUri", Schema::optional(Schema::String))
        .into()
}

pub fn generate_response_output() -> Schema {
    ObjectSchema::new()
        .described("response", Schema::String, "The generated reply.")
        .into()
}

pub fn summarize_page_input() -> Schema {
    ObjectSchema::new()
        .field("url", Schema::String)
        .field("additionalContext", Schema::optional(Schema::String))
        .into()
}

pub fn summarize_page_output() -> Schema {
    ObjectSchema::new()
        .described("summary", Schema::String, "A concise summary of the page.")
        .into()
}

// ── Templates ────────────────────────────────────────────────────────────

const INTERPRET_TEMPLATE: &str = "\
Interpret this voice command for a browser assistant.
Command: {{ command }}
{% if context %}Custom commands available (JSON): {{ context }}
{% endif %}
Classify the intent as \"navigate\", \"search\", \"customAction\" or \"unknown\" and extract any parameters. \
If the command corresponds to one of the custom command phrases, use \"customAction\" and copy that phrase, \
exactly as registered, into parameters.matchedPhrase. \
If you cannot tell what the user wants, answer with action \"unknown\", empty parameters and confidence 0.";

const GENERATE_TEMPLATE: &str = "\
You are the Devil's Advocate: a curious, conversational partner who explores the other side of an idea \
instead of simply answering it.
Reply in the language whose two-letter code is \"{{ language }}\".
{% if mediaDataUri %}The user attached an image or video; treat it as part of the query.
{% endif %}Context: {{ context }}
Query: {{ query }}";

const SUMMARIZE_TEMPLATE: &str = "\
Summarize the content of the web page at {{ url }} in a few sentences.
{% if additionalContext %}Additional context: {{ additionalContext }}
{% endif %}";

// ── Registration ─────────────────────────────────────────────────────────

/// Invokers for the three conversation flows.
#[derive(Debug, Clone)]
pub struct AiFlows {
    interpret: Invoker,
    generate: Invoker,
    summarize: Invoker,
}

impl AiFlows {
    /// Register all six units on `registry`.
    pub fn define(registry: &mut FlowRegistry) -> Result<Self, RegistryError> {
        let interpret_prompt = registry.define_prompt(PromptSpec::new(
            names::INTERPRET_COMMAND_PROMPT,
            interpret_command_input(),
            interpret_command_output(),
            INTERPRET_TEMPLATE,
        ))?;
        let generate_prompt = registry.define_prompt(
            PromptSpec::new(
                names::GENERATE_RESPONSE_PROMPT,
                generate_response_input(),
                generate_response_output(),
                GENERATE_TEMPLATE,
            )
            .with_media_field("mediaDataUri"),
        )?;
        let summarize_prompt = registry.define_prompt(PromptSpec::new(
            names::SUMMARIZE_PAGE_PROMPT,
            summarize_page_input(),
            summarize_page_output(),
            SUMMARIZE_TEMPLATE,
        ))?;

        let interpret = registry.define_flow(FlowSpec::new(
            names::INTERPRET_COMMAND_FLOW,
            interpret_command_input(),
            interpret_command_output(),
            move |input: Value| {
                let prompt = interpret_prompt.clone();
                async move { prompt.invoke(input).await }
            },
        ))?;

        let generate = registry.define_flow(FlowSpec::new(
            names::GENERATE_RESPONSE_FLOW,
            generate_response_input(),
            generate_response_output(),
            move |mut input: Value| {
                let prompt = generate_prompt.clone();
                async move {
                    let missing = input
                        .get("language")
                        .and_then(Value::as_str)
                        .is_none_or(|l| l.trim().is_empty());
                    if missing {
                        if let Some(map) = input.as_object_mut() {
                            map.insert("language".into(), json!(DEFAULT_LANGUAGE));
                        }
                    }
                    prompt.invoke(input).await
                }
            },
        ))?;

        let summarize = registry.define_flow(FlowSpec::new(
            names::SUMMARIZE_PAGE_FLOW,
            summarize_page_input(),
            summarize_page_output(),
            move |input: Value| {
                let prompt = summarize_prompt.clone();
                async move {
                    match prompt.invoke(input.clone()).await {
                        Err(FlowError::EmptyOutput { .. }) => {
                            error!(
                                unit = names::SUMMARIZE_PAGE_PROMPT,
                                input = %crate::redact::redacted(&input),
                                "prompt returned no output"
                            );
                            Ok(json!({ "summary": SUMMARY_UNAVAILABLE }))
                        }
                        other => other,
                    }
                }
            },
        ))?;

        Ok(Self {
            interpret,
            generate,
            summarize,
        })
    }

    /// Classify an utterance. Confidence outside `[0, 1]` is rejected.
    pub async fn interpret_command(
        &self,
        input: &InterpretCommandInput,
    ) -> Result<InterpretationResult, FlowError> {
        let result: InterpretationResult = call(&self.interpret, input).await?;
        if !(0.0..=1.0).contains(&result.confidence) {
            return Err(FlowError::Validation(ValidationError {
                path: "$.confidence".into(),
                expected: "number in [0, 1]".into(),
                found: result.confidence.to_string(),
            }));
        }
        Ok(result)
    }

    pub async fn generate_response(
        &self,
        input: &GenerateResponseInput,
    ) -> Result<GenerateResponseOutput, FlowError> {
        call(&self.generate, input).await
    }

    pub async fn summarize_page(
        &self,
        url: &str,
        additional_context: Option<&str>,
    ) -> Result<SummarizePageOutput, FlowError> {
        let input = SummarizePageInput {
            url: url.to_string(),
            additional_context: additional_context.map(str::to_string),
        };
        call(&self.summarize, &input).await
    }
}

async fn call<I, O>(invoker: &Invoker, input: &I) -> Result<O, FlowError>
where
    I: Serialize,
    O: for<'de> Deserialize<'de>,
{
    let value = serde_json::to_value(input)?;
    let output = invoker.invoke(value).await?;
    Ok(serde_json::from_value(output)?)
}

/// The two AI calls a conversation turn needs.
#[async_trait]
pub trait ConversationAi: Send + Sync {
    async fn interpret_command(
        &self,
        input: &InterpretCommandInput,
    ) -> Result<InterpretationResult, FlowError>;

    async fn generate_response(
        &self,
        input: &GenerateResponseInput,
    ) -> Result<GenerateResponseOutput, FlowError>;
}

#[async_trait]
impl ConversationAi for AiFlows {
    async fn interpret_command(
        &self,
        input: &InterpretCommandInput,
    ) -> Result<InterpretationResult, FlowError> {
        AiFlows::interpret_command(self, input).await
    }

    async fn generate_response(
        &self,
        input: &GenerateResponseInput,
    ) -> Result<GenerateResponseOutput, FlowError> {
        AiFlows::generate_response(self, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpretation_parameters_default_to_empty() {
        let r: InterpretationResult =
            serde_json::from_value(json!({"action": "unknown", "confidence": 0})).unwrap();
        assert!(r.parameters.is_empty());
        assert!(r.matched_phrase().is_none());
    }

    #[test]
    fn matched_phrase_lookup() {
        let r: InterpretationResult = serde_json::from_value(json!({
            "action": "customAction",
            "parameters": {"matchedPhrase": "open news", "actionUrl": "https://news.example.com"},
            "confidence": 0.95
        }))
        .unwrap();
        assert_eq!(r.matched_phrase(), Some("open news"));
    }

    #[test]
    fn generate_input_uses_camel_case() {
        let input = GenerateResponseInput {
            context: "c".into(),
            query: "q".into(),
            language: None,
            media_data_uri: Some("data:image/png;base64,AAAA".into()),
        };
        let v = serde_json::to_value(&input).unwrap();
        assert_eq!(v["mediaDataUri"], "data:image/png;base64,AAAA");
        assert!(v.get("language").is_none());
        assert!(generate_response_input().validate(&v).is_ok());
    }

    #[test]
    fn summarize_input_uses_camel_case() {
        let v = serde_json::to_value(SummarizePageInput {
            url: "https://a.example".into(),
            additional_context: Some("focus on pricing".into()),
        })
        .unwrap();
        assert_eq!(v["additionalContext"], "focus on pricing");
    }

    #[test]
    fn output_schemas_accept_curated_shapes() {
        assert!(
            interpret_command_output()
                .validate(&json!({"action": "unknown", "parameters": {}, "confidence": 0}))
                .is_ok()
        );
        assert!(generate_response_output().validate(&json!({"response": "x"})).is_ok());
        assert!(summarize_page_output().validate(&json!({"summary": "x"})).is_ok());
    }
}
