//! Relay frames pushed to the caller during a streamed turn.
//!
//! The wire shape mirrors the OpenAI `chat.completion.chunk` object so that
//! existing client code can consume it unchanged. A turn always produces
//! `Start`, zero or more content `Data` frames, one terminal `Data` frame
//! with `finish_reason: "stop"`, and `End`.

use crate::conversation::entities::Role;
use serde::{Deserialize, Serialize};

/// `object` value carried by every chunk.
pub const CHUNK_OBJECT: &str = "chat.completion.chunk";

/// Finish reason sent on the terminal data frame.
pub const FINISH_STOP: &str = "stop";

/// One frame of the push stream.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayFrame {
    Start,
    Data(ChatCompletionChunk),
    End,
}

impl RelayFrame {
    /// SSE event name for this frame.
    pub fn event_name(&self) -> &'static str {
        match self {
            RelayFrame::Start => "start",
            RelayFrame::Data(_) => "data",
            RelayFrame::End => "end",
        }
    }

    pub fn chunk(&self) -> Option<&ChatCompletionChunk> {
        match self {
            RelayFrame::Data(chunk) => Some(chunk),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChunkChoice>,
}

impl ChatCompletionChunk {
    /// Content of the first choice's delta, if any.
    pub fn content(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.delta.content.as_deref())
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.finish_reason.as_deref())
    }

    pub fn is_stop(&self) -> bool {
        self.finish_reason() == Some(FINISH_STOP)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    pub index: u32,
    pub delta: ChunkDelta,
    /// Always `null`; kept for wire compatibility.
    pub logprobs: Option<serde_json::Value>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Fixed per-turn fields shared by every chunk of one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHeader {
    pub response_id: String,
    pub model: String,
}

impl ChunkHeader {
    pub fn new(response_id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            response_id: response_id.into(),
            model: model.into(),
        }
    }

    /// A content frame.
    pub fn delta(&self, role: Option<Role>, content: impl Into<String>) -> ChatCompletionChunk {
        self.chunk(
            ChunkDelta {
                role,
                content: Some(content.into()),
            },
            None,
        )
    }

    /// The terminal frame: empty delta, `finish_reason: "stop"`.
    pub fn stop(&self) -> ChatCompletionChunk {
        self.chunk(ChunkDelta::default(), Some(FINISH_STOP.to_string()))
    }

    fn chunk(&self, delta: ChunkDelta, finish_reason: Option<String>) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: self.response_id.clone(),
            object: CHUNK_OBJECT.to_string(),
            created: chrono::Utc::now().timestamp(),
            model: self.model.clone(),
            choices: vec![ChunkChoice {
                index: 0,
                delta,
                logprobs: None,
                finish_reason,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_chunk_wire_shape() {
        let header = ChunkHeader::new("resp-1", "deepseek-chat");
        let chunk = header.delta(Some(Role::Assistant), "Hel");
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["id"], "resp-1");
        assert_eq!(json["object"], "chat.completion.chunk");
        assert_eq!(json["model"], "deepseek-chat");
        assert_eq!(json["choices"][0]["index"], 0);
        assert_eq!(json["choices"][0]["delta"]["role"], "assistant");
        assert_eq!(json["choices"][0]["delta"]["content"], "Hel");
        assert!(json["choices"][0]["logprobs"].is_null());
        assert!(json["choices"][0]["finish_reason"].is_null());
    }

    #[test]
    fn stop_chunk_has_empty_delta() {
        let chunk = ChunkHeader::new("resp-1", "m").stop();
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["choices"][0]["delta"], serde_json::json!({}));
        assert_eq!(json["choices"][0]["finish_reason"], "stop");
        assert!(chunk.is_stop());
        assert_eq!(chunk.content(), None);
    }

    #[test]
    fn frame_event_names() {
        let header = ChunkHeader::new("r", "m");
        assert_eq!(RelayFrame::Start.event_name(), "start");
        assert_eq!(RelayFrame::Data(header.stop()).event_name(), "data");
        assert_eq!(RelayFrame::End.event_name(), "end");
    }
}
