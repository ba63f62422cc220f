//! Conversation orchestrator.
//!
//! Owns one session's state and sequences each turn:
//!
//! ```text
//! Idle -> Sending -> interpret -> { custom command | contextual response } -> Idle
//!                                          |
//!                                   (failure) -> explanation -> static apology
//! ```
//!
//! Recording and the pending media attachment are independent flags. All
//! transitions take `&mut self`, so at most one turn is in flight and a
//! turn cannot overlap with recording.

pub mod host;

use std::future::Future;
use std::time::Duration;

use advocate_types::command::{CommandSet, CustomCommand};
use advocate_types::config::SessionConfig;
use advocate_types::language::Language;
use advocate_types::media::{MediaAttachment, MediaError, MediaKind};
use advocate_types::message::ConversationMessage;
use advocate_types::AdvocateError;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub use host::{Notice, SessionHost, Severity};

use crate::error::FlowError;
use crate::flows::{ConversationAi, GenerateResponseInput, InterpretCommandInput, names};
use crate::preferences::PreferenceStore;
use crate::resolve::resolve_custom_command;

/// Appended when both recovery tiers fail. Never spoken.
pub const STATIC_APOLOGY: &str =
    "I've encountered an unexpected issue and can't process that right now. Please try again later.";

/// Query sent with the error context on the second recovery tier.
pub const ERROR_EXPLANATION_QUERY: &str = "Explain that an error happened, in a simple way.";

/// Query sent after a custom command has been executed.
pub const ACKNOWLEDGE_QUERY: &str = "Acknowledge command execution.";

/// Whether a turn is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sending,
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// A custom command was opened and acknowledged.
    CommandExecuted { command: CustomCommand, reply: String },
    /// The contextual response succeeded.
    Replied { reply: String },
    /// The turn failed and the explanation call succeeded.
    Recovered { error: String, reply: String },
    /// Both tiers failed; the static apology was appended.
    Failed { error: String },
}

impl TurnOutcome {
    /// Text of the AI message this turn appended.
    pub fn reply(&self) -> &str {
        match self {
            TurnOutcome::CommandExecuted { reply, .. }
            | TurnOutcome::Replied { reply }
            | TurnOutcome::Recovered { reply, .. } => reply,
            TurnOutcome::Failed { .. } => STATIC_APOLOGY,
        }
    }
}

/// A transition was rejected before any AI call was made.
#[derive(Error, Debug)]
pub enum TransitionError {
    #[error("a message is already being processed")]
    Busy,

    #[error("not available while recording")]
    Recording,

    #[error("a question or comment about the attached media is required")]
    QueryRequired,

    #[error("nothing to send")]
    EmptyInput,

    #[error("media rejected: {0}")]
    Media(#[from] MediaError),

    #[error(transparent)]
    Preferences(#[from] AdvocateError),
}

/// Speech recognition failure categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    NotAllowed,
    NoSpeech,
    AudioCapture,
    Other(String),
}

impl RecognitionError {
    /// Classify a recognizer error code.
    pub fn from_code(code: &str) -> Self {
        match code {
            "not-allowed" | "service-not-allowed" => RecognitionError::NotAllowed,
            "no-speech" => RecognitionError::NoSpeech,
            "audio-capture" => RecognitionError::AudioCapture,
            other => RecognitionError::Other(other.to_string()),
        }
    }

    fn notice(&self) -> Notice {
        match self {
            RecognitionError::NotAllowed => Notice::error(
                "Microphone Access Denied",
                "To use voice input, please allow microphone access.",
            ),
            RecognitionError::NoSpeech => {
                Notice::info("No Speech Detected", "No speech was detected. Please try again.")
            }
            RecognitionError::AudioCapture => Notice::error(
                "Microphone Unavailable",
                "No microphone was found, or it is in use by another application.",
            ),
            RecognitionError::Other(code) => {
                Notice::error("Speech Error", format!("Recognition error: {code}"))
            }
        }
    }
}

/// Per-session conversation controller.
pub struct Orchestrator<A, H> {
    ai: A,
    host: H,
    preferences: PreferenceStore,
    commands: CommandSet,
    language: Language,
    phase: Phase,
    recording: bool,
    interim: String,
    media: Option<MediaAttachment>,
    messages: Vec<ConversationMessage>,
    share_url: bool,
    current_url: Option<String>,
    audio_output: bool,
    response_timeout: Duration,
}

impl<A: ConversationAi, H: SessionHost> Orchestrator<A, H> {
    /// Start a session, loading the language and custom commands.
    pub async fn start(ai: A, host: H, preferences: PreferenceStore, session: &SessionConfig) -> Self {
        let language = preferences.load_language().await;
        let commands = preferences.load_commands().await;
        info!(
            language = %language.code(),
            commands = commands.len(),
            share_url = session.share_url,
            "session started"
        );
        Self {
            ai,
            host,
            preferences,
            commands,
            language,
            phase: Phase::Idle,
            recording: false,
            interim: String::new(),
            media: None,
            messages: Vec::new(),
            share_url: session.share_url,
            current_url: session.current_url.clone(),
            audio_output: session.audio_output,
            response_timeout: Duration::from_secs(session.response_timeout_secs),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    pub fn media(&self) -> Option<&MediaAttachment> {
        self.media.as_ref()
    }

    pub fn interim_transcript(&self) -> &str {
        &self.interim
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    // ── Turn ─────────────────────────────────────────────────────────────

    /// Send `text` (plus any attached media) as one turn.
    ///
    /// AI failures never surface here; they are handled by the recovery
    /// chain and reported in the returned [`TurnOutcome`].
    pub async fn submit(&mut self, text: &str) -> Result<TurnOutcome, TransitionError> {
        if self.phase == Phase::Sending {
            return Err(TransitionError::Busy);
        }
        if self.recording {
            return Err(TransitionError::Recording);
        }
        let query = text.trim();
        if query.is_empty() {
            if self.media.is_some() {
                self.host.notify(Notice::info(
                    "Query Required",
                    "Please type a question or comment about the uploaded media.",
                ));
                return Err(TransitionError::QueryRequired);
            }
            return Err(TransitionError::EmptyInput);
        }

        self.phase = Phase::Sending;
        self.messages.push(ConversationMessage::user(query));

        let outcome = match self.primary(query).await {
            Ok(outcome) => outcome,
            Err(e) => self.recover(e).await,
        };

        self.media = None;
        self.phase = Phase::Idle;
        Ok(outcome)
    }

    async fn primary(&mut self, query: &str) -> Result<TurnOutcome, FlowError> {
        let input = InterpretCommandInput {
            command: query.to_string(),
            context: self.commands_context(),
        };
        let interpretation = bounded(
            self.response_timeout,
            names::INTERPRET_COMMAND_FLOW,
            self.ai.interpret_command(&input),
        )
        .await?;
        debug!(
            action = %interpretation.action,
            confidence = interpretation.confidence,
            "utterance interpreted"
        );

        if let Some(command) = resolve_custom_command(&interpretation, query, &self.commands).cloned() {
            return self.execute_command(command).await;
        }

        let input = GenerateResponseInput {
            context: self.compose_context(query),
            query: query.to_string(),
            language: Some(self.language.code().to_string()),
            media_data_uri: self.media.as_ref().map(|m| m.data_uri().to_string()),
        };
        let output = bounded(
            self.response_timeout,
            names::GENERATE_RESPONSE_FLOW,
            self.ai.generate_response(&input),
        )
        .await?;

        self.reply(&output.response, true).await;
        Ok(TurnOutcome::Replied {
            reply: output.response,
        })
    }

    /// The URL is opened before the acknowledgment is requested.
    async fn execute_command(&mut self, command: CustomCommand) -> Result<TurnOutcome, FlowError> {
        info!(phrase = %command.phrase, url = %command.action_url, "executing custom command");
        if let Err(e) = self.host.open_url(&command.action_url).await {
            warn!(url = %command.action_url, error = %e, "could not open custom command URL");
        }

        let input = GenerateResponseInput {
            context: format!(
                "User executed a custom command: \"{}\" which opens {}",
                command.phrase, command.action_url
            ),
            query: ACKNOWLEDGE_QUERY.to_string(),
            language: Some(self.language.code().to_string()),
            media_data_uri: None,
        };
        let output = bounded(
            self.response_timeout,
            names::GENERATE_RESPONSE_FLOW,
            self.ai.generate_response(&input),
        )
        .await?;

        self.reply(&output.response, true).await;
        Ok(TurnOutcome::CommandExecuted {
            command,
            reply: output.response,
        })
    }

    async fn recover(&mut self, failure: FlowError) -> TurnOutcome {
        let message = failure.to_string();
        error!(error = %message, "turn failed, requesting an explanation");

        let input = GenerateResponseInput {
            context: format!("An error occurred: {message}"),
            query: ERROR_EXPLANATION_QUERY.to_string(),
            language: Some(self.language.code().to_string()),
            media_data_uri: None,
        };
        let explained = bounded(
            self.response_timeout,
            names::GENERATE_RESPONSE_FLOW,
            self.ai.generate_response(&input),
        )
        .await;

        match explained {
            Ok(output) => {
                self.reply(&output.response, true).await;
                TurnOutcome::Recovered {
                    error: message,
                    reply: output.response,
                }
            }
            Err(second) => {
                error!(error = %second, "explanation also failed");
                self.reply(STATIC_APOLOGY, false).await;
                self.host.notify(Notice::error("AI Error", message.clone()));
                TurnOutcome::Failed { error: message }
            }
        }
    }

    async fn reply(&mut self, text: &str, speak: bool) {
        self.messages.push(ConversationMessage::ai(text));
        if !(speak && self.audio_output) {
            return;
        }
        if let Err(e) = self.host.speak(text, self.language).await {
            warn!(error = %e, "speech output failed");
            self.host
                .notify(Notice::error("Speech Error", "Could not play audio response."));
        }
    }

    fn compose_context(&self, query: &str) -> String {
        if !self.share_url {
            return query.to_string();
        }
        match self.current_url.as_deref() {
            Some(url) => format!("Current page context: {url}. User query: {query}"),
            None => {
                debug!("URL sharing is on but no current URL is set");
                query.to_string()
            }
        }
    }

    fn commands_context(&self) -> Option<String> {
        match self.commands.to_json() {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(error = %e, "could not serialize custom commands for interpretation");
                None
            }
        }
    }

    // ── Media ────────────────────────────────────────────────────────────

    /// Attach an image or video data URI to the next turn.
    pub fn attach_media(&mut self, data_uri: &str) -> Result<MediaKind, TransitionError> {
        self.ensure_idle()?;
        let parsed = MediaAttachment::parse(data_uri);
        self.accept_media(parsed)
    }

    /// Attach raw file contents with their MIME type.
    pub fn attach_media_bytes(&mut self, mime_type: &str, bytes: &[u8]) -> Result<MediaKind, TransitionError> {
        self.ensure_idle()?;
        let encoded = MediaAttachment::from_bytes(mime_type, bytes);
        self.accept_media(encoded)
    }

    fn accept_media(&mut self, media: Result<MediaAttachment, MediaError>) -> Result<MediaKind, TransitionError> {
        match media {
            Ok(media) => {
                let kind = media.kind();
                debug!(mime = %media.mime_type(), "media attached");
                self.media = Some(media);
                Ok(kind)
            }
            Err(e) => {
                self.host.notify(Notice::error(
                    "Invalid File Type",
                    "Please upload an image or video file.",
                ));
                Err(e.into())
            }
        }
    }

    pub fn clear_media(&mut self) -> Result<(), TransitionError> {
        self.ensure_idle()?;
        self.media = None;
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), TransitionError> {
        if self.phase == Phase::Sending {
            return Err(TransitionError::Busy);
        }
        if self.recording {
            return Err(TransitionError::Recording);
        }
        Ok(())
    }

    // ── Settings ─────────────────────────────────────────────────────────

    /// Change the reply language for later turns and persist it.
    pub async fn set_language(&mut self, language: Language) -> Result<(), TransitionError> {
        self.language = language;
        self.preferences.save_language(language).await?;
        Ok(())
    }

    pub fn set_share_url(&mut self, enabled: bool) {
        self.share_url = enabled;
    }

    pub fn set_current_url(&mut self, url: Option<String>) {
        self.current_url = url;
    }

    pub fn clear_conversation(&mut self) {
        debug!(count = self.messages.len(), "conversation cleared");
        self.messages.clear();
    }

    // ── Custom commands ──────────────────────────────────────────────────

    pub async fn add_command(&mut self, phrase: &str, action_url: &str) -> Result<CustomCommand, TransitionError> {
        let added = self.preferences.add_command(phrase, action_url).await?;
        self.commands = self.preferences.load_commands().await;
        Ok(added)
    }

    pub async fn remove_command(&mut self, id: &str) -> Result<Option<CustomCommand>, TransitionError> {
        let removed = self.preferences.remove_command(id).await?;
        self.commands = self.preferences.load_commands().await;
        Ok(removed)
    }

    // ── Recording ────────────────────────────────────────────────────────

    pub fn start_recording(&mut self) -> Result<(), TransitionError> {
        if self.phase == Phase::Sending {
            return Err(TransitionError::Busy);
        }
        self.recording = true;
        self.interim.clear();
        Ok(())
    }

    /// Update the input field; nothing is sent.
    pub fn on_interim_transcript(&mut self, text: &str) {
        if !self.recording {
            return;
        }
        self.interim = text.to_string();
        self.host.show_input(text);
    }

    /// Stop recording and send the final transcript.
    pub async fn on_final_transcript(&mut self, text: &str) -> Result<TurnOutcome, TransitionError> {
        self.recording = false;
        self.interim.clear();
        self.submit(text).await
    }

    /// Explicit stop. Any interim transcript is discarded.
    pub fn stop_recording(&mut self) {
        self.recording = false;
        self.interim.clear();
    }

    /// End of speech without a final transcript. Interim text is dropped.
    pub fn on_speech_end(&mut self) {
        self.recording = false;
        self.interim.clear();
    }

    pub fn on_recognition_error(&mut self, error: RecognitionError) {
        warn!(error = ?error, "speech recognition failed");
        self.recording = false;
        self.interim.clear();
        self.host.notify(error.notice());
    }
}

/// Run an AI call under the session's response timeout.
async fn bounded<T>(
    limit: Duration,
    unit: &str,
    call: impl Future<Output = Result<T, FlowError>>,
) -> Result<T, FlowError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(unit, secs = limit.as_secs(), "AI call timed out");
            Err(FlowError::Timeout {
                unit: unit.to_string(),
                secs: limit.as_secs(),
            })
        }
    }
}
