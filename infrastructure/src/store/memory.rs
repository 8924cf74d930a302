//! In-memory transcript store.

use async_trait::async_trait;
use chatrelay_application::ports::transcript_store::{StoreError, TranscriptStore};
use chatrelay_domain::{Conversation, ConversationId, Message, MessageId, NewMessage};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    conversations: HashMap<ConversationId, Conversation>,
    messages: Vec<Message>,
    next_message_id: i64,
}

/// Transcript store that lives for the duration of the process.
#[derive(Default)]
pub struct InMemoryTranscriptStore {
    state: Mutex<State>,
}

impl InMemoryTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::Backend(format!("store lock poisoned: {}", e)))
    }

    /// Remove a conversation and all of its messages.
    pub async fn delete_conversation(&self, id: &ConversationId) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.conversations.remove(id).is_none() {
            return Err(StoreError::NotFound(id.clone()));
        }
        state.messages.retain(|m| &m.conversation_id != id);
        Ok(())
    }
}

#[async_trait]
impl TranscriptStore for InMemoryTranscriptStore {
    async fn create_conversation(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.conversations.contains_key(&conversation.id) {
            return Err(StoreError::Backend(format!(
                "conversation {} already exists",
                conversation.id
            )));
        }
        state
            .conversations
            .insert(conversation.id.clone(), conversation.clone());
        Ok(())
    }

    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, StoreError> {
        Ok(self.lock()?.conversations.get(id).cloned())
    }

    async fn update_conversation(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let stored = state
            .conversations
            .get_mut(&conversation.id)
            .ok_or_else(|| StoreError::NotFound(conversation.id.clone()))?;
        stored.title = conversation.title.clone();
        stored.updated_at = conversation.updated_at;
        Ok(())
    }

    async fn append_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        let mut state = self.lock()?;
        if !state.conversations.contains_key(&message.conversation_id) {
            return Err(StoreError::NotFound(message.conversation_id));
        }
        state.next_message_id += 1;
        let stored = message.into_message(MessageId(state.next_message_id));
        state.messages.push(stored.clone());
        Ok(stored)
    }

    async fn list_messages(&self, id: &ConversationId) -> Result<Vec<Message>, StoreError> {
        let state = self.lock()?;
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| &m.conversation_id == id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }
}
