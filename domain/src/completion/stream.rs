//! Streaming events for chat completions.
//!
//! [`StreamEvent`] represents individual events in a streaming completion,
//! bridging the provider transport (SSE chunks from an OpenAI-compatible
//! endpoint) to the application layer.

use crate::conversation::entities::Role;

/// An event in a streaming completion.
///
/// A well-behaved stream yields any number of `Delta` events followed by
/// exactly one terminal event (`Completed` or `Error`). A stream that simply
/// ends is treated the same as `Completed` by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// An incremental piece of assistant output.
    ///
    /// `role` is only present on the first chunk for most providers.
    /// `content` may be empty (role-only or keep-alive chunks).
    Delta {
        role: Option<Role>,
        content: String,
    },
    /// The provider signalled the end of the completion.
    Completed { finish_reason: Option<String> },
    /// The stream broke after it was opened.
    Error(String),
}

impl StreamEvent {
    pub fn delta(content: impl Into<String>) -> Self {
        StreamEvent::Delta {
            role: None,
            content: content.into(),
        }
    }

    /// Returns the text content if this is a non-empty Delta.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta { content, .. } if !content.is_empty() => Some(content),
            _ => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed { .. } | StreamEvent::Error(_))
    }
}
