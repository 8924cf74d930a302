//! Transcript store port
//!
//! Durable storage for conversations and their messages. Each call is
//! individually atomic; there are no cross-call transactions.

use async_trait::async_trait;
use chatrelay_domain::{Conversation, ConversationId, Message, NewMessage};
use thiserror::Error;

/// Errors that can occur during transcript store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),
}

/// Port for conversation and message persistence
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Persist a new conversation.
    async fn create_conversation(&self, conversation: &Conversation) -> Result<(), StoreError>;

    /// Fetch a conversation; `Ok(None)` when it does not exist.
    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, StoreError>;

    /// Overwrite title and `updated_at`. [`StoreError::NotFound`] when absent.
    async fn update_conversation(&self, conversation: &Conversation) -> Result<(), StoreError>;

    /// Append a message, assigning its id.
    async fn append_message(&self, message: NewMessage) -> Result<Message, StoreError>;

    /// All messages of a conversation ordered by `created_at`, then id.
    ///
    /// Repeated calls with no intervening writes return identical results.
    async fn list_messages(&self, id: &ConversationId) -> Result<Vec<Message>, StoreError>;
}
