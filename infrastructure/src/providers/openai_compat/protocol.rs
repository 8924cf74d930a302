//! Wire types for OpenAI-compatible `/chat/completions`.

use chatrelay_domain::{ChatMessage, Role};
use serde::{Deserialize, Serialize};

/// Request body for a chat completion.
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
}

/// One `data:` payload of a streaming response.
#[derive(Debug, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: WireDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl WireDelta {
    /// Known roles only; vendor-specific roles are dropped.
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }
}

/// Non-streaming response body.
#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<ResponseChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// `{"error": {"message": ...}}`, sent both as a non-2xx body and mid-stream.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

/// Best-effort human message from an error body.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_roles_lowercase() {
        let messages = vec![ChatMessage::system("be brief"), ChatMessage::user("hi")];
        let body = serde_json::to_value(CompletionRequest {
            model: "qwen-turbo-latest",
            messages: &messages,
            stream: true,
        })
        .unwrap();

        assert_eq!(body["model"], "qwen-turbo-latest");
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
    }

    #[test]
    fn chunk_tolerates_missing_fields() {
        let chunk: StreamChunk = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.choices[0].delta.content, None);
        assert_eq!(chunk.choices[0].delta.role(), None);
        assert_eq!(chunk.choices[0].finish_reason.as_deref(), Some("stop"));

        let chunk: StreamChunk = serde_json::from_str(r#"{"usage":{"total_tokens":3}}"#).unwrap();
        assert!(chunk.choices.is_empty());
    }

    #[test]
    fn delta_role_parses_known_roles() {
        let chunk: StreamChunk = serde_json::from_str(
            r#"{"choices":[{"delta":{"role":"assistant","content":""}},{"delta":{"role":"tool"}}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.choices[0].delta.role(), Some(Role::Assistant));
        assert_eq!(chunk.choices[1].delta.role(), None);
    }

    #[test]
    fn error_message_prefers_envelope() {
        assert_eq!(
            error_message(r#"{"error":{"message":"Invalid API key","type":"auth"}}"#),
            "Invalid API key"
        );
        assert_eq!(error_message(" upstream down \n"), "upstream down");
    }
}
