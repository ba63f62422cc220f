//! Conversation orchestrator scenarios with a scripted AI and a recording
//! host.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use advocate_core::error::FlowError;
use advocate_core::flows::{
    AiFlows, ConversationAi, GenerateResponseInput, GenerateResponseOutput, InterpretCommandInput,
    InterpretationResult,
};
use advocate_core::orchestrator::host::{Notice, SessionHost, Severity};
use advocate_core::orchestrator::{
    ACKNOWLEDGE_QUERY, ERROR_EXPLANATION_QUERY, Orchestrator, Phase, RecognitionError,
    STATIC_APOLOGY, TransitionError, TurnOutcome,
};
use advocate_core::preferences::{COMMANDS_KEY, PreferenceStore};
use advocate_core::registry::FlowRegistry;
use advocate_core::schema::ValidationError;
use advocate_core::backend::noop::NoOpBackend;
use advocate_platform::kv::{KeyValueStore, MemoryStore};
use advocate_types::config::SessionConfig;
use advocate_types::language::Language;
use advocate_types::message::Sender;

// ── Test doubles ─────────────────────────────────────────────────────────

type Reply = Result<String, String>;

/// AI with a fixed interpretation and a queue of generate replies.
#[derive(Clone, Default)]
struct ScriptedAi {
    interpretation: Arc<Mutex<Option<InterpretationResult>>>,
    replies: Arc<Mutex<VecDeque<Reply>>>,
    generate_calls: Arc<Mutex<Vec<GenerateResponseInput>>>,
    interpret_calls: Arc<Mutex<Vec<InterpretCommandInput>>>,
    interpret_failure: Option<fn() -> FlowError>,
    generate_delay: Option<Duration>,
}

impl ScriptedAi {
    fn interpreting(self, action: &str, confidence: f64, matched: Option<&str>) -> Self {
        let mut parameters = Map::new();
        if let Some(p) = matched {
            parameters.insert("matchedPhrase".into(), Value::String(p.into()));
        }
        *self.interpretation.lock().unwrap() = Some(InterpretationResult {
            action: action.into(),
            parameters,
            confidence,
        });
        self
    }

    fn failing_interpretation(self, failure: fn() -> FlowError) -> Self {
        Self {
            interpret_failure: Some(failure),
            ..self
        }
    }

    fn replying(self, replies: &[Reply]) -> Self {
        self.replies.lock().unwrap().extend(replies.iter().cloned());
        self
    }

    fn generate_calls(&self) -> Vec<GenerateResponseInput> {
        self.generate_calls.lock().unwrap().clone()
    }
}

fn failure(message: &str) -> FlowError {
    FlowError::EmptyOutput {
        unit: message.to_string(),
    }
}

fn confidence_out_of_range() -> FlowError {
    FlowError::Validation(ValidationError {
        path: "$.confidence".into(),
        expected: "number in [0, 1]".into(),
        found: "7".into(),
    })
}

#[async_trait]
impl ConversationAi for ScriptedAi {
    async fn interpret_command(
        &self,
        input: &InterpretCommandInput,
    ) -> Result<InterpretationResult, FlowError> {
        self.interpret_calls.lock().unwrap().push(input.clone());
        if let Some(failure) = self.interpret_failure {
            return Err(failure());
        }
        let scripted = self.interpretation.lock().unwrap().clone();
        Ok(scripted.unwrap_or(InterpretationResult {
            action: "unknown".into(),
            parameters: Map::new(),
            confidence: 0.0,
        }))
    }

    async fn generate_response(
        &self,
        input: &GenerateResponseInput,
    ) -> Result<GenerateResponseOutput, FlowError> {
        self.generate_calls.lock().unwrap().push(input.clone());
        if let Some(delay) = self.generate_delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(response)) => Ok(GenerateResponseOutput { response }),
            Some(Err(message)) => Err(failure(&message)),
            None => Err(failure("no scripted reply")),
        }
    }
}

#[derive(Clone, Default)]
struct RecordingHost {
    opened: Arc<Mutex<Vec<String>>>,
    spoken: Arc<Mutex<Vec<String>>>,
    notices: Arc<Mutex<Vec<Notice>>>,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl RecordingHost {
    fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionHost for RecordingHost {
    async fn open_url(&self, url: &str) -> std::io::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn speak(&self, text: &str, _language: Language) -> std::io::Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }

    fn show_input(&self, text: &str) {
        self.inputs.lock().unwrap().push(text.to_string());
    }
}

const IMAGE: &str = "data:image/png;base64,iVBORw0KGgo=";

async fn session_with(
    ai: ScriptedAi,
    store: MemoryStore,
    config: SessionConfig,
) -> (Orchestrator<ScriptedAi, RecordingHost>, RecordingHost) {
    let host = RecordingHost::default();
    let prefs = PreferenceStore::new(Arc::new(store));
    let orch = Orchestrator::start(ai, host.clone(), prefs, &config).await;
    (orch, host)
}

async fn session(ai: ScriptedAi) -> (Orchestrator<ScriptedAi, RecordingHost>, RecordingHost) {
    session_with(ai, MemoryStore::new(), SessionConfig::default()).await
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn custom_command_opens_url_and_acknowledges() {
    let ai = ScriptedAi::default()
        .interpreting("customAction", 0.95, Some("open news"))
        .replying(&[Ok("Opening the news for you.".into())]);
    let (mut orch, host) = session(ai.clone()).await;
    orch.add_command("open news", "https://news.example.com").await.unwrap();

    let outcome = orch.submit("open news").await.unwrap();

    assert!(matches!(outcome, TurnOutcome::CommandExecuted { .. }));
    assert_eq!(host.opened(), vec!["https://news.example.com"]);

    let calls = ai.generate_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query, ACKNOWLEDGE_QUERY);
    assert_eq!(
        calls[0].context,
        "User executed a custom command: \"open news\" which opens https://news.example.com"
    );

    let ai_messages: Vec<_> = orch.messages().iter().filter(|m| m.sender == Sender::Ai).collect();
    assert_eq!(ai_messages.len(), 1);
    assert_eq!(ai_messages[0].text, "Opening the news for you.");
    assert_eq!(orch.phase(), Phase::Idle);
}

#[tokio::test]
async fn interpretation_receives_commands_as_context() {
    let ai = ScriptedAi::default().replying(&[Ok("ok".into())]);
    let (mut orch, _) = session(ai.clone()).await;
    orch.add_command("weather", "https://weather.example.com").await.unwrap();

    orch.submit("what's up").await.unwrap();

    let calls = ai.interpret_calls.lock().unwrap().clone();
    assert_eq!(calls[0].command, "what's up");
    let context: Value = serde_json::from_str(calls[0].context.as_deref().unwrap()).unwrap();
    assert_eq!(context[0]["phrase"], "weather");
    assert_eq!(context[0]["actionUrl"], "https://weather.example.com");
}

#[tokio::test]
async fn confidence_threshold_is_strict() {
    let ai = ScriptedAi::default()
        .interpreting("customAction", 0.7, Some("open news"))
        .replying(&[Ok("general answer".into())]);
    let (mut orch, host) = session(ai.clone()).await;
    orch.add_command("open news", "https://news.example.com").await.unwrap();

    let outcome = orch.submit("open news").await.unwrap();
    assert_eq!(outcome, TurnOutcome::Replied { reply: "general answer".into() });
    assert!(host.opened().is_empty());
    assert_eq!(ai.generate_calls()[0].query, "open news");

    let ai = ScriptedAi::default()
        .interpreting("customAction", 0.71, Some("open news"))
        .replying(&[Ok("done".into())]);
    let (mut orch, host) = session(ai).await;
    orch.add_command("open news", "https://news.example.com").await.unwrap();
    let outcome = orch.submit("open news").await.unwrap();
    assert!(matches!(outcome, TurnOutcome::CommandExecuted { .. }));
    assert_eq!(host.opened().len(), 1);
}

#[tokio::test]
async fn phrase_matching_ignores_case_and_whitespace() {
    let ai = ScriptedAi::default()
        .interpreting("customAction", 0.9, None)
        .replying(&[Ok("done".into())]);
    let (mut orch, host) = session(ai).await;
    orch.add_command("Open News", "https://news.example.com").await.unwrap();

    orch.submit("  open news  ").await.unwrap();
    assert_eq!(host.opened(), vec!["https://news.example.com"]);
}

#[tokio::test]
async fn general_response_carries_language_media_and_shared_url() {
    let ai = ScriptedAi::default().replying(&[Ok("Bonjour".into())]);
    let config = SessionConfig {
        share_url: true,
        current_url: Some("https://page.example.com".into()),
        ..SessionConfig::default()
    };
    let (mut orch, host) = session_with(ai.clone(), MemoryStore::new(), config).await;
    orch.set_language(Language::French).await.unwrap();
    orch.attach_media(IMAGE).unwrap();

    let outcome = orch.submit("what is this?").await.unwrap();
    assert_eq!(outcome.reply(), "Bonjour");

    let call = &ai.generate_calls()[0];
    assert_eq!(
        call.context,
        "Current page context: https://page.example.com. User query: what is this?"
    );
    assert_eq!(call.query, "what is this?");
    assert_eq!(call.language.as_deref(), Some("fr"));
    assert_eq!(call.media_data_uri.as_deref(), Some(IMAGE));

    assert!(orch.media().is_none());
    assert_eq!(host.spoken(), vec!["Bonjour"]);
}

#[tokio::test]
async fn failed_turn_recovers_with_explanation() {
    let ai = ScriptedAi::default().replying(&[Err("primary".into()), Ok("Something went wrong.".into())]);
    let (mut orch, host) = session(ai.clone()).await;

    let outcome = orch.submit("hello").await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Recovered { .. }));

    let calls = ai.generate_calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].context.starts_with("An error occurred: "));
    assert_eq!(calls[1].query, ERROR_EXPLANATION_QUERY);
    assert!(calls[1].media_data_uri.is_none());

    assert_eq!(host.spoken(), vec!["Something went wrong."]);
    assert!(host.notices().is_empty());
}

#[tokio::test]
async fn both_tiers_failing_appends_one_unspoken_apology() {
    let ai = ScriptedAi::default().replying(&[Err("primary".into()), Err("secondary".into())]);
    let (mut orch, host) = session(ai.clone()).await;
    orch.attach_media(IMAGE).unwrap();

    let outcome = orch.submit("hello").await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Failed { .. }));
    assert_eq!(ai.generate_calls().len(), 2);

    let messages = orch.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[1].text, STATIC_APOLOGY);

    assert!(host.spoken().is_empty());
    let notices = host.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "AI Error");
    assert_eq!(notices[0].severity, Severity::Error);

    assert!(orch.media().is_none());
    assert_eq!(orch.phase(), Phase::Idle);
}

#[tokio::test]
async fn invalid_interpretation_enters_recovery() {
    let ai = ScriptedAi::default()
        .failing_interpretation(confidence_out_of_range)
        .replying(&[Ok("I got confused there.".into())]);
    let (mut orch, host) = session(ai.clone()).await;
    orch.add_command("open news", "https://news.example.com").await.unwrap();
    orch.attach_media(IMAGE).unwrap();

    let outcome = orch.submit("open news").await.unwrap();
    match &outcome {
        TurnOutcome::Recovered { error, reply } => {
            assert!(error.contains("$.confidence"));
            assert_eq!(reply, "I got confused there.");
        }
        other => panic!("expected recovery, got {other:?}"),
    }

    let calls = ai.generate_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query, ERROR_EXPLANATION_QUERY);
    assert!(calls[0].context.starts_with("An error occurred: "));
    assert!(calls[0].context.contains("$.confidence"));

    assert!(host.opened().is_empty());
    assert!(host.notices().is_empty());
    assert!(orch.media().is_none());
    assert_eq!(orch.phase(), Phase::Idle);
}

#[tokio::test]
async fn interpretation_failure_with_failed_explanation_apologizes() {
    let ai = ScriptedAi::default()
        .failing_interpretation(|| failure("interpret"))
        .replying(&[Err("explain".into())]);
    let (mut orch, host) = session(ai.clone()).await;

    let outcome = orch.submit("hello").await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Failed { .. }));
    assert_eq!(ai.generate_calls().len(), 1);

    let messages = orch.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].text, STATIC_APOLOGY);
    assert!(host.spoken().is_empty());
    let notices = host.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "AI Error");
    assert_eq!(orch.phase(), Phase::Idle);
}

#[tokio::test]
async fn failed_acknowledgment_recovers_without_undoing_the_open() {
    let ai = ScriptedAi::default()
        .interpreting("customAction", 0.95, Some("open news"))
        .replying(&[Err("acknowledge".into()), Ok("The page is open, but I hit a snag.".into())]);
    let (mut orch, host) = session(ai.clone()).await;
    orch.add_command("open news", "https://news.example.com").await.unwrap();
    orch.attach_media(IMAGE).unwrap();

    let outcome = orch.submit("open news").await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Recovered { .. }));
    assert_eq!(host.opened(), vec!["https://news.example.com"]);

    let calls = ai.generate_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].query, ACKNOWLEDGE_QUERY);
    assert_eq!(calls[1].query, ERROR_EXPLANATION_QUERY);

    let messages = orch.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].text, "The page is open, but I hit a snag.");
    assert!(orch.media().is_none());
    assert_eq!(orch.phase(), Phase::Idle);
}

#[tokio::test]
async fn hung_call_times_out_into_recovery() {
    let ai = ScriptedAi {
        generate_delay: Some(Duration::from_secs(5)),
        ..ScriptedAi::default()
    }
    .replying(&[Ok("late".into()), Ok("late".into())]);
    let config = SessionConfig {
        response_timeout_secs: 1,
        ..SessionConfig::default()
    };
    let (mut orch, host) = session_with(ai, MemoryStore::new(), config).await;

    let outcome = orch.submit("hello").await.unwrap();
    match outcome {
        TurnOutcome::Failed { error } => assert!(error.contains("did not finish within 1s")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(host.notices()[0].title, "AI Error");
}

#[tokio::test]
async fn media_without_query_is_rejected() {
    let ai = ScriptedAi::default();
    let (mut orch, host) = session(ai.clone()).await;
    orch.attach_media(IMAGE).unwrap();

    let err = orch.submit("   ").await.unwrap_err();
    assert!(matches!(err, TransitionError::QueryRequired));
    assert_eq!(host.notices()[0].title, "Query Required");
    assert!(orch.messages().is_empty());
    assert!(ai.generate_calls().is_empty());
    assert!(orch.media().is_some());

    assert!(matches!(orch.submit("").await.unwrap_err(), TransitionError::EmptyInput));
}

#[tokio::test]
async fn invalid_media_is_rejected_with_notice() {
    let (mut orch, host) = session(ScriptedAi::default()).await;
    let err = orch.attach_media("data:application/pdf;base64,AAAA").unwrap_err();
    assert!(matches!(err, TransitionError::Media(_)));
    assert_eq!(host.notices()[0].title, "Invalid File Type");
    assert!(orch.media().is_none());
}

#[tokio::test]
async fn malformed_stored_commands_start_empty() {
    let store = MemoryStore::new();
    store.set(COMMANDS_KEY, "not json at all").await.unwrap();

    let (orch, _) = session_with(ScriptedAi::default(), store.clone(), SessionConfig::default()).await;
    assert!(orch.commands().is_empty());
    assert!(store.get(COMMANDS_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn recording_lifecycle() {
    let ai = ScriptedAi::default().replying(&[Ok("heard you".into())]);
    let (mut orch, host) = session(ai.clone()).await;

    orch.start_recording().unwrap();
    assert!(orch.is_recording());
    assert!(matches!(orch.attach_media(IMAGE).unwrap_err(), TransitionError::Recording));
    assert!(matches!(orch.submit("typed").await.unwrap_err(), TransitionError::Recording));

    orch.on_interim_transcript("hel");
    assert_eq!(orch.interim_transcript(), "hel");
    assert_eq!(host.inputs.lock().unwrap().as_slice(), ["hel"]);
    assert!(ai.generate_calls().is_empty());

    let outcome = orch.on_final_transcript("hello there").await.unwrap();
    assert_eq!(outcome.reply(), "heard you");
    assert!(!orch.is_recording());
    assert_eq!(orch.messages()[0].text, "hello there");
}

#[tokio::test]
async fn stop_discards_interim_transcript() {
    let (mut orch, _) = session(ScriptedAi::default()).await;
    orch.start_recording().unwrap();
    orch.on_interim_transcript("half a sent");
    orch.stop_recording();
    assert!(!orch.is_recording());
    assert_eq!(orch.interim_transcript(), "");
    assert!(orch.messages().is_empty());
}

#[tokio::test]
async fn speech_end_discards_interim_transcript() {
    let (mut orch, host) = session(ScriptedAi::default()).await;
    orch.start_recording().unwrap();
    orch.on_interim_transcript("trailing off");
    orch.on_speech_end();
    assert!(!orch.is_recording());
    assert_eq!(orch.interim_transcript(), "");
    assert!(orch.messages().is_empty());
    assert!(host.notices().is_empty());
}

#[tokio::test]
async fn recognition_error_stops_and_notifies() {
    let (mut orch, host) = session(ScriptedAi::default()).await;
    orch.start_recording().unwrap();
    orch.on_recognition_error(RecognitionError::from_code("not-allowed"));
    assert!(!orch.is_recording());
    assert_eq!(host.notices()[0].title, "Microphone Access Denied");
}

#[tokio::test]
async fn language_persists_across_sessions() {
    let store = MemoryStore::new();
    let (mut orch, _) = session_with(ScriptedAi::default(), store.clone(), SessionConfig::default()).await;
    assert_eq!(orch.language(), Language::English);
    orch.set_language(Language::Spanish).await.unwrap();

    let (orch, _) = session_with(ScriptedAi::default(), store, SessionConfig::default()).await;
    assert_eq!(orch.language(), Language::Spanish);
}

#[tokio::test]
async fn clear_conversation_empties_transcript() {
    let ai = ScriptedAi::default().replying(&[Ok("hi".into())]);
    let (mut orch, _) = session(ai).await;
    orch.submit("hello").await.unwrap();
    assert_eq!(orch.messages().len(), 2);
    orch.clear_conversation();
    assert!(orch.messages().is_empty());
}

#[tokio::test]
async fn degraded_session_speaks_placeholder() {
    let mut registry = FlowRegistry::new(Arc::new(NoOpBackend));
    let flows = AiFlows::define(&mut registry).unwrap();
    let host = RecordingHost::default();
    let prefs = PreferenceStore::new(Arc::new(MemoryStore::new()));
    let mut orch = Orchestrator::start(flows, host.clone(), prefs, &SessionConfig::default()).await;

    let outcome = orch.submit("hi").await.unwrap();
    match outcome {
        TurnOutcome::Replied { reply } => {
            assert!(reply.ends_with("(NoOp for generateResponseFromContextFlow)"))
        }
        other => panic!("expected a reply, got {other:?}"),
    }
    assert!(host.opened().is_empty());
    assert_eq!(host.spoken().len(), 1);
}

#[tokio::test]
async fn file_bytes_attach_by_mime_type() {
    let (mut orch, host) = session(ScriptedAi::default()).await;
    assert!(orch.attach_media_bytes("image/jpeg", &[0xff, 0xd8, 0xff]).is_ok());
    assert!(orch.media().unwrap().data_uri().starts_with("data:image/jpeg;base64,"));

    orch.clear_media().unwrap();
    assert!(orch.attach_media_bytes("text/plain", b"hello").is_err());
    assert!(orch.media().is_none());
    assert_eq!(host.notices()[0].title, "Invalid File Type");
}
