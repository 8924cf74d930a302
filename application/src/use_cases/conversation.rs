//! Conversation management: create, rename, detail and history.

use crate::error::ErrorKind;
use crate::ports::transcript_store::{StoreError, TranscriptStore};
use chatrelay_domain::{Conversation, ConversationId, Message};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors that can occur while managing conversations.
#[derive(Error, Debug)]
pub enum ConversationError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("Persistence error: {0}")]
    Persistence(StoreError),
}

impl ConversationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversationError::Validation(_) => ErrorKind::Validation,
            ConversationError::NotFound(_) => ErrorKind::NotFound,
            ConversationError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

impl From<StoreError> for ConversationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ConversationError::NotFound(id),
            other => ConversationError::Persistence(other),
        }
    }
}

/// Messages of one conversation, in store order.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationHistory {
    pub conversation_id: ConversationId,
    pub messages: Vec<Message>,
}

/// Inbound conversation operations other than streaming.
#[derive(Clone)]
pub struct ConversationService {
    store: Arc<dyn TranscriptStore>,
}

impl ConversationService {
    pub fn new(store: Arc<dyn TranscriptStore>) -> Self {
        Self { store }
    }

    /// Create a conversation with a fresh id and an empty title.
    pub async fn create(&self, owner: Option<String>) -> Result<Conversation, ConversationError> {
        let conversation = Conversation::new(owner);
        self.store.create_conversation(&conversation).await?;
        info!("Created conversation {}", conversation.id);
        Ok(conversation)
    }

    pub async fn rename(
        &self,
        id: &ConversationId,
        title: &str,
    ) -> Result<Conversation, ConversationError> {
        let mut conversation = self.detail(id).await?;
        conversation.retitle(title.trim());
        self.store.update_conversation(&conversation).await?;
        Ok(conversation)
    }

    pub async fn detail(&self, id: &ConversationId) -> Result<Conversation, ConversationError> {
        require_id(id)?;
        self.store
            .get_conversation(id)
            .await?
            .ok_or_else(|| ConversationError::NotFound(id.clone()))
    }

    pub async fn history(
        &self,
        id: &ConversationId,
    ) -> Result<ConversationHistory, ConversationError> {
        require_id(id)?;
        let messages = self.store.list_messages(id).await?;
        Ok(ConversationHistory {
            conversation_id: id.clone(),
            messages,
        })
    }
}

fn require_id(id: &ConversationId) -> Result<(), ConversationError> {
    if id.is_blank() {
        return Err(ConversationError::Validation(
            "conversation id must not be empty".to_string(),
        ));
    }
    Ok(())
}
