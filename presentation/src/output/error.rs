//! Structured error payloads.
//!
//! Every foreground failure is rendered as
//! `{"error": <kind code>, "message": <text>, "raw_content"?: <model text>}`.

use chatrelay_application::{
    ConversationError, ErrorKind, ExtractError, FetchExtractError, TranslateError, TurnError,
};
use serde::Serialize;
use std::fmt::Display;

/// An application error that can be reported to the caller.
pub trait ReportedError: Display {
    fn kind(&self) -> ErrorKind;

    /// Cleaned model output attached to extraction failures.
    fn raw_content(&self) -> Option<&str> {
        None
    }
}

impl ReportedError for TurnError {
    fn kind(&self) -> ErrorKind {
        TurnError::kind(self)
    }
}

impl ReportedError for ConversationError {
    fn kind(&self) -> ErrorKind {
        ConversationError::kind(self)
    }
}

impl ReportedError for ExtractError {
    fn kind(&self) -> ErrorKind {
        ExtractError::kind(self)
    }

    fn raw_content(&self) -> Option<&str> {
        ExtractError::raw_content(self)
    }
}

impl ReportedError for TranslateError {
    fn kind(&self) -> ErrorKind {
        TranslateError::kind(self)
    }

    fn raw_content(&self) -> Option<&str> {
        TranslateError::raw_content(self)
    }
}

impl ReportedError for FetchExtractError {
    fn kind(&self) -> ErrorKind {
        FetchExtractError::kind(self)
    }

    fn raw_content(&self) -> Option<&str> {
        FetchExtractError::raw_content(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

impl ErrorPayload {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            error: kind.code(),
            message: message.into(),
            raw_content: None,
        }
    }

    pub fn from_error(err: &dyn ReportedError) -> Self {
        Self {
            error: err.kind().code(),
            message: err.to_string(),
            raw_content: err.raw_content().map(str::to_string),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_application::GatewayError;
    use chatrelay_domain::Provider;

    #[test]
    fn extraction_errors_carry_raw_content() {
        let err = ExtractError::Malformed {
            reason: "expected value at line 1".into(),
            raw: "Sorry, I can't".into(),
        };
        let payload = ErrorPayload::from_error(&err);

        assert_eq!(payload.error, "extraction");
        assert_eq!(payload.raw_content.as_deref(), Some("Sorry, I can't"));
        let json: serde_json::Value = serde_json::from_str(&payload.to_json()).unwrap();
        assert_eq!(json["raw_content"], "Sorry, I can't");
    }

    #[test]
    fn other_errors_omit_raw_content() {
        let err = TurnError::Gateway(GatewayError::MissingCredential(Provider::Kimi));
        let payload = ErrorPayload::from_error(&err);

        assert_eq!(payload.error, "missing_credential");
        assert!(payload.message.contains("kimi"));
        let json: serde_json::Value = serde_json::from_str(&payload.to_json()).unwrap();
        assert!(json.get("raw_content").is_none());
    }

    #[test]
    fn validation_payload() {
        let payload = ErrorPayload::new(ErrorKind::Validation, "input must not be empty");
        assert_eq!(payload.error, "validation");
    }
}
