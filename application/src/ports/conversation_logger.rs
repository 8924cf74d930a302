//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording turn lifecycle
//! events (turn started, messages persisted, stream interrupted, titles) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the
//! conversation lifecycle in a machine-readable format (JSONL).

use serde_json::Value;

/// Event type names emitted by the use cases.
pub mod events {
    pub const TURN_STARTED: &str = "turn_started";
    pub const TURN_FAILED: &str = "turn_failed";
    pub const USER_MESSAGE_PERSISTED: &str = "user_message_persisted";
    pub const STREAM_OPENED: &str = "stream_opened";
    pub const STREAM_INTERRUPTED: &str = "stream_interrupted";
    pub const ASSISTANT_MESSAGE_PERSISTED: &str = "assistant_message_persisted";
    pub const TITLE_GENERATED: &str = "title_generated";
    pub const TITLE_FAILED: &str = "title_failed";
}

/// A structured conversation event for logging.
///
/// Each event has a type string and a JSON payload containing event-specific
/// fields. The timestamp is added by the adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEvent {
    /// Event type identifier (one of [`events`]).
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging conversation events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL line).
/// The `log` method is synchronous and non-fallible; logging failures are
/// ignored by implementations.
pub trait ConversationLogger: Send + Sync {
    /// Record a conversation event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
