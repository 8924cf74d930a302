//! Hand-written mocks shared by the use case tests.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
use crate::ports::relay_sink::{RelayClosed, RelaySink};
use crate::ports::transcript_store::{StoreError, TranscriptStore};
use async_trait::async_trait;
use chatrelay_domain::{
    ChatMessage, Conversation, ConversationId, Message, MessageId, ModelTarget, NewMessage,
    RelayFrame, Role, StreamEvent,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One scripted gateway call.
pub(crate) enum Script {
    /// Open successfully and replay these events, then close.
    Stream(Vec<StreamEvent>),
    /// Open successfully and keep producing deltas until cancelled.
    Endless(CancellationToken),
    /// Fail to open.
    OpenError(GatewayError),
}

impl Script {
    pub(crate) fn text(chunks: &[&str]) -> Self {
        let mut events: Vec<StreamEvent> = chunks.iter().map(|c| StreamEvent::delta(*c)).collect();
        events.push(StreamEvent::Completed {
            finish_reason: Some("stop".to_string()),
        });
        Script::Stream(events)
    }
}

/// Mock gateway that plays back scripts in call order
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    scripts: Mutex<VecDeque<Script>>,
    calls: Mutex<Vec<(ModelTarget, Vec<ChatMessage>)>>,
}

impl ScriptedGateway {
    pub(crate) fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(ModelTarget, Vec<ChatMessage>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn stream_complete(
        &self,
        target: &ModelTarget,
        history: &[ChatMessage],
    ) -> Result<StreamHandle, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push((target.clone(), history.to_vec()));
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Script::text(&["(default response)"]));

        match script {
            Script::OpenError(e) => Err(e),
            Script::Stream(events) => {
                let (tx, rx) = mpsc::channel(events.len().max(1));
                for event in events {
                    tx.try_send(event).unwrap();
                }
                Ok(StreamHandle::from_receiver(rx))
            }
            Script::Endless(token) => {
                let (tx, rx) = mpsc::channel(1);
                let producer_token = token.clone();
                tokio::spawn(async move {
                    loop {
                        tokio::select! {
                            _ = producer_token.cancelled() => break,
                            sent = tx.send(StreamEvent::delta("tick")) => {
                                if sent.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                });
                Ok(StreamHandle::new(rx, token))
            }
        }
    }
}

/// In-memory store with switchable failures
#[derive(Default)]
pub(crate) struct MemoryStore {
    conversations: Mutex<HashMap<ConversationId, Conversation>>,
    messages: Mutex<Vec<Message>>,
    next_id: AtomicI64,
    fail_append_role: Mutex<Option<Role>>,
    fail_reads: Mutex<bool>,
}

impl MemoryStore {
    pub(crate) fn fail_appends_for(&self, role: Role) {
        *self.fail_append_role.lock().unwrap() = Some(role);
    }

    pub(crate) fn fail_reads(&self) {
        *self.fail_reads.lock().unwrap() = true;
    }

    pub(crate) fn messages_of(&self, id: &ConversationId) -> Vec<Message> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.conversation_id == id)
            .cloned()
            .collect()
    }

    pub(crate) fn title_of(&self, id: &ConversationId) -> Option<String> {
        self.conversations
            .lock()
            .unwrap()
            .get(id)
            .map(|c| c.title.clone())
    }

    pub(crate) fn seed(&self) -> Conversation {
        let conversation = Conversation::new(None);
        self.conversations
            .lock()
            .unwrap()
            .insert(conversation.id.clone(), conversation.clone());
        conversation
    }
}

#[async_trait]
impl TranscriptStore for MemoryStore {
    async fn create_conversation(&self, conversation: &Conversation) -> Result<(), StoreError> {
        self.conversations
            .lock()
            .unwrap()
            .insert(conversation.id.clone(), conversation.clone());
        Ok(())
    }

    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, StoreError> {
        if *self.fail_reads.lock().unwrap() {
            return Err(StoreError::Backend("read failed".into()));
        }
        Ok(self.conversations.lock().unwrap().get(id).cloned())
    }

    async fn update_conversation(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let mut conversations = self.conversations.lock().unwrap();
        match conversations.get_mut(&conversation.id) {
            Some(existing) => {
                existing.title = conversation.title.clone();
                existing.updated_at = conversation.updated_at;
                Ok(())
            }
            None => Err(StoreError::NotFound(conversation.id.clone())),
        }
    }

    async fn append_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        if *self.fail_append_role.lock().unwrap() == Some(message.role) {
            return Err(StoreError::Backend("disk full".into()));
        }
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let stored = message.into_message(id);
        self.messages.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn list_messages(&self, id: &ConversationId) -> Result<Vec<Message>, StoreError> {
        Ok(self.messages_of(id))
    }
}

/// Sink that records frames and can simulate a disconnect
#[derive(Default)]
pub(crate) struct CollectingSink {
    frames: Mutex<Vec<RelayFrame>>,
    accept: Option<usize>,
}

impl CollectingSink {
    /// Accept `n` frames, then report a disconnect.
    pub(crate) fn disconnect_after(n: usize) -> Self {
        Self {
            frames: Mutex::new(Vec::new()),
            accept: Some(n),
        }
    }

    pub(crate) fn frames(&self) -> Vec<RelayFrame> {
        self.frames.lock().unwrap().clone()
    }

    /// Concatenated content of all data frames.
    pub(crate) fn text(&self) -> String {
        self.frames()
            .iter()
            .filter_map(|f| f.chunk().and_then(|c| c.content()).map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl RelaySink for CollectingSink {
    async fn send(&self, frame: RelayFrame) -> Result<(), RelayClosed> {
        let mut frames = self.frames.lock().unwrap();
        if self.accept.is_some_and(|n| frames.len() >= n) {
            return Err(RelayClosed);
        }
        frames.push(frame);
        Ok(())
    }
}

/// Logger that keeps every event
#[derive(Default)]
pub(crate) struct RecordingLogger {
    events: Mutex<Vec<ConversationEvent>>,
}

impl RecordingLogger {
    pub(crate) fn events(&self) -> Vec<ConversationEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn event_types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type)
            .collect()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events.lock().unwrap().push(event);
    }
}
