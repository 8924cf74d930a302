//! Stream Turn use case.
//!
//! Runs one conversational turn: validates the request, persists the user
//! message, streams the provider's answer to a [`RelaySink`] while
//! accumulating it, persists the assistant message and, on a conversation's
//! first turn, dispatches a detached title task.
//!
//! # State machine
//!
//! ```text
//! Validating -> LoadingHistory -> Streaming -> Persisting -> [TitleDispatched] -> Done
//!      |              |               |
//!      +--------------+---------------+--> Error (foreground failure, nothing relayed)
//! ```
//!
//! Once the stream is open the turn always reaches `Done`: a mid-stream
//! provider failure ends the relay early with the usual terminal frames, and
//! a failed assistant write is reported in the [`TurnReport`] only.
//!
//! Two turns on the same conversation are not serialized. Both user messages
//! are persisted and each turn sees whatever history was stored when it read.

use crate::config::TitleConfig;
use crate::error::ErrorKind;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, events,
};
use crate::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
use crate::ports::relay_sink::RelaySink;
use crate::ports::transcript_store::{StoreError, TranscriptStore};
use crate::use_cases::generate_title::TitleGenerator;
use chatrelay_domain::util::truncate_str;
use chatrelay_domain::{
    ChatMessage, ChunkHeader, ConversationId, NewMessage, Provider, ProviderRegistry, RelayFrame,
    StreamEvent, to_chat_history,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Errors that end a turn before anything is relayed.
#[derive(Error, Debug)]
pub enum TurnError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("{0}")]
    Gateway(#[from] GatewayError),

    #[error("Persistence error: {0}")]
    Persistence(StoreError),
}

impl TurnError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TurnError::Validation(_) => ErrorKind::Validation,
            TurnError::NotFound(_) => ErrorKind::NotFound,
            TurnError::Gateway(e) => e.kind(),
            TurnError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

/// Turn lifecycle states, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Validating,
    LoadingHistory,
    Streaming,
    Persisting,
    TitleDispatched,
    Done,
    Error,
}

/// Input for the [`StreamTurnUseCase`].
#[derive(Debug, Clone)]
pub struct StreamTurnInput {
    pub conversation_id: ConversationId,
    /// The user's message.
    pub input: String,
    /// Model specifier; empty or absent selects the default provider.
    pub model: Option<String>,
}

impl StreamTurnInput {
    pub fn new(conversation_id: impl Into<ConversationId>, input: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            input: input.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// How the relay ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnFinish {
    /// The provider finished (or closed the stream) normally.
    Completed,
    /// The provider stream broke mid-way. Invisible on the wire.
    Interrupted(String),
    /// The consumer went away; no terminal frames were sent.
    Disconnected,
}

/// Outcome of a turn that got past stream open.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub conversation_id: ConversationId,
    pub response_id: String,
    pub provider: Provider,
    pub model: String,
    pub assistant_text: String,
    pub finish: TurnFinish,
    pub assistant_persisted: bool,
    pub title_dispatched: bool,
}

/// Use case for running one streamed conversational turn.
#[derive(Clone)]
pub struct StreamTurnUseCase {
    gateway: Arc<dyn LlmGateway>,
    store: Arc<dyn TranscriptStore>,
    registry: Arc<ProviderRegistry>,
    conversation_logger: Arc<dyn ConversationLogger>,
    title: TitleConfig,
    title_generator: TitleGenerator,
    background: TaskTracker,
}

impl StreamTurnUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        store: Arc<dyn TranscriptStore>,
        registry: Arc<ProviderRegistry>,
    ) -> Self {
        let title = TitleConfig::default();
        let title_generator =
            TitleGenerator::new(gateway.clone(), store.clone(), registry.clone(), &title);
        Self {
            gateway,
            store,
            registry,
            conversation_logger: Arc::new(NoConversationLogger),
            title,
            title_generator,
            background: TaskTracker::new(),
        }
    }

    /// Configure the auto-title task.
    pub fn with_title_config(mut self, config: TitleConfig) -> Self {
        self.title_generator = TitleGenerator::new(
            self.gateway.clone(),
            self.store.clone(),
            self.registry.clone(),
            &config,
        )
        .with_conversation_logger(self.conversation_logger.clone());
        self.title = config;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.title_generator = self
            .title_generator
            .with_conversation_logger(logger.clone());
        self.conversation_logger = logger;
        self
    }

    /// Stop accepting background work and wait up to `grace` for running
    /// tasks. Returns `false` if the grace period ran out.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.background.close();
        tokio::time::timeout(grace, self.background.wait())
            .await
            .is_ok()
    }

    fn transition(&self, id: &ConversationId, state: TurnState) {
        debug!("Turn {}: -> {:?}", id, state);
    }

    fn log_event(&self, event_type: &'static str, payload: serde_json::Value) {
        self.conversation_logger
            .log(ConversationEvent::new(event_type, payload));
    }

    /// Execute the turn, pushing frames to `sink`.
    ///
    /// On `Err` nothing has been relayed. On `Ok` the sink has seen `Start`,
    /// the content frames, the terminal `stop` frame and `End`, unless the
    /// report says [`TurnFinish::Disconnected`].
    pub async fn execute(
        &self,
        input: StreamTurnInput,
        sink: &dyn RelaySink,
    ) -> Result<TurnReport, TurnError> {
        let id = input.conversation_id.clone();
        let result = self.run(input, sink).await;
        if let Err(e) = &result {
            self.transition(&id, TurnState::Error);
            self.log_event(
                events::TURN_FAILED,
                json!({
                    "conversation_id": id.as_str(),
                    "error": e.kind().code(),
                    "message": e.to_string(),
                }),
            );
        }
        result
    }

    async fn run(
        &self,
        input: StreamTurnInput,
        sink: &dyn RelaySink,
    ) -> Result<TurnReport, TurnError> {
        let id = input.conversation_id;
        self.transition(&id, TurnState::Validating);

        if id.is_blank() {
            return Err(TurnError::Validation(
                "conversation id must not be empty".to_string(),
            ));
        }
        let text = input.input.trim().to_string();
        if text.is_empty() {
            return Err(TurnError::Validation("input must not be empty".to_string()));
        }
        self.store
            .get_conversation(&id)
            .await
            .map_err(TurnError::Persistence)?
            .ok_or_else(|| TurnError::NotFound(id.clone()))?;

        let target = self.registry.resolve(input.model.as_deref().unwrap_or(""));
        info!(
            "Starting turn on {} with {}: {}",
            id,
            target,
            truncate_str(&text, 100)
        );
        self.log_event(
            events::TURN_STARTED,
            json!({
                "conversation_id": id.as_str(),
                "provider": target.provider.as_str(),
                "model": target.model,
            }),
        );

        self.transition(&id, TurnState::LoadingHistory);
        let prior = self
            .store
            .list_messages(&id)
            .await
            .map_err(TurnError::Persistence)?;
        let first_turn = prior.is_empty();
        let mut history = to_chat_history(&prior);
        history.push(ChatMessage::user(text.clone()));

        let user_message = self
            .store
            .append_message(NewMessage::user(id.clone(), text.clone()))
            .await
            .map_err(TurnError::Persistence)?;
        self.log_event(
            events::USER_MESSAGE_PERSISTED,
            json!({
                "conversation_id": id.as_str(),
                "message_id": user_message.id.0,
            }),
        );

        self.transition(&id, TurnState::Streaming);
        let mut stream = match self.gateway.stream_complete(&target, &history).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Failed to open stream for {}: {}", id, e);
                return Err(e.into());
            }
        };
        self.log_event(
            events::STREAM_OPENED,
            json!({
                "conversation_id": id.as_str(),
                "history_len": history.len(),
            }),
        );

        let header = ChunkHeader::new(uuid::Uuid::new_v4().to_string(), target.model.clone());
        let (assistant_text, finish) = self.relay(&id, &mut stream, &header, sink).await;
        drop(stream);

        self.transition(&id, TurnState::Persisting);
        let assistant_persisted = match self
            .store
            .append_message(NewMessage::assistant(id.clone(), assistant_text.clone()))
            .await
        {
            Ok(message) => {
                self.log_event(
                    events::ASSISTANT_MESSAGE_PERSISTED,
                    json!({
                        "conversation_id": id.as_str(),
                        "message_id": message.id.0,
                        "chars": assistant_text.chars().count(),
                    }),
                );
                true
            }
            Err(e) => {
                warn!("Failed to persist assistant message for {}: {}", id, e);
                false
            }
        };

        let title_dispatched = first_turn && self.title.enabled;
        if title_dispatched {
            self.transition(&id, TurnState::TitleDispatched);
            let generator = self.title_generator.clone();
            let (title_id, first_user, answer) = (id.clone(), text, assistant_text.clone());
            self.background.spawn(async move {
                generator.run(title_id, first_user, answer).await;
            });
        }

        if finish != TurnFinish::Disconnected && sink.send(RelayFrame::End).await.is_err() {
            debug!("Consumer of {} left before the end frame", id);
        }

        self.transition(&id, TurnState::Done);
        info!("Turn on {} finished: {:?}", id, finish);

        Ok(TurnReport {
            conversation_id: id,
            response_id: header.response_id,
            provider: target.provider,
            model: target.model,
            assistant_text,
            finish,
            assistant_persisted,
            title_dispatched,
        })
    }

    /// Relay the stream to the sink. Returns the accumulated text and how the
    /// relay ended. Sends every frame up to and including the terminal `stop`
    /// frame; `End` is left to the caller.
    async fn relay(
        &self,
        id: &ConversationId,
        stream: &mut StreamHandle,
        header: &ChunkHeader,
        sink: &dyn RelaySink,
    ) -> (String, TurnFinish) {
        let mut text = String::new();

        if sink.send(RelayFrame::Start).await.is_err() {
            stream.cancel();
            return (text, TurnFinish::Disconnected);
        }

        let mut finish = TurnFinish::Completed;
        while let Some(event) = stream.next().await {
            match event {
                StreamEvent::Delta { role, content } => {
                    if content.is_empty() {
                        continue;
                    }
                    text.push_str(&content);
                    let frame = RelayFrame::Data(header.delta(role, content));
                    if sink.send(frame).await.is_err() {
                        info!("Consumer of {} disconnected, cancelling stream", id);
                        stream.cancel();
                        return (text, TurnFinish::Disconnected);
                    }
                }
                StreamEvent::Completed { finish_reason } => {
                    debug!("Provider finished {}: {:?}", id, finish_reason);
                    break;
                }
                StreamEvent::Error(e) => {
                    warn!("Stream for {} interrupted: {}", id, e);
                    self.log_event(
                        events::STREAM_INTERRUPTED,
                        json!({
                            "conversation_id": id.as_str(),
                            "error": e,
                            "chars_relayed": text.chars().count(),
                        }),
                    );
                    finish = TurnFinish::Interrupted(e);
                    break;
                }
            }
        }

        if sink.send(RelayFrame::Data(header.stop())).await.is_err() {
            return (text, TurnFinish::Disconnected);
        }
        (text, finish)
    }
}
