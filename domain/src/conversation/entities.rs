//! Conversation domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, immutable conversation identifier (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identifier is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ConversationId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A conversation (Entity)
///
/// The identifier never changes after creation. The title starts empty and
/// is set either by the auto-title task or by an explicit rename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a conversation with a freshly generated identifier and an empty title.
    pub fn new(owner: Option<String>) -> Self {
        Self::with_id(ConversationId::generate(), owner)
    }

    pub fn with_id(id: ConversationId, owner: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: String::new(),
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the title and bump `updated_at`.
    pub fn retitle(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.updated_at = Utc::now();
    }

    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }
}

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Store-assigned message sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

/// A persisted message (Entity, immutable once stored)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn to_chat(&self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// A message that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl NewMessage {
    pub fn user(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self::now(conversation_id, Role::User, content)
    }

    pub fn assistant(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self::now(conversation_id, Role::Assistant, content)
    }

    fn now(conversation_id: ConversationId, role: Role, content: impl Into<String>) -> Self {
        Self {
            conversation_id,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Attach the store-assigned id.
    pub fn into_message(self, id: MessageId) -> Message {
        Message {
            id,
            conversation_id: self.conversation_id,
            role: self.role,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

/// A `{role, content}` pair as sent to a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Convert stored messages into provider history, preserving order.
pub fn to_chat_history(messages: &[Message]) -> Vec<ChatMessage> {
    messages.iter().map(Message::to_chat).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_conversation_has_empty_title_and_fresh_id() {
        let a = Conversation::new(None);
        let b = Conversation::new(Some("user-1".to_string()));
        assert!(a.title.is_empty());
        assert!(!a.id.is_blank());
        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[test]
    fn retitle_bumps_updated_at() {
        let mut conv = Conversation::new(None);
        let before = conv.updated_at;
        conv.retitle("Rust questions");
        assert_eq!(conv.title, "Rust questions");
        assert!(conv.updated_at >= before);
        assert!(conv.has_title());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert!("tool".parse::<Role>().is_err());
    }

    #[test]
    fn blank_conversation_id_detected() {
        assert!(ConversationId::new("  ").is_blank());
        assert!(!ConversationId::new("abc").is_blank());
    }

    #[test]
    fn history_conversion_keeps_order() {
        let id = ConversationId::new("c1");
        let messages = vec![
            NewMessage::user(id.clone(), "hi").into_message(MessageId(1)),
            NewMessage::assistant(id, "hello").into_message(MessageId(2)),
        ];
        let history = to_chat_history(&messages);
        assert_eq!(history, vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")]);
    }
}
