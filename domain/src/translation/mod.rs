//! Segment translation request/response shapes and policies.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// One piece of text to translate, addressed by a caller-chosen id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateSegment {
    pub id: String,
    pub text: String,
}

impl TranslateSegment {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub target: String,
    pub segments: Vec<TranslateSegment>,
    /// Free-form translation requirements (a string, or an object such as
    /// `{"style": "formal"}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_args: Option<Value>,
    /// Model specifier; the default provider is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl TranslateRequest {
    pub fn new(target: impl Into<String>, segments: Vec<TranslateSegment>) -> Self {
        Self {
            target: target.into(),
            segments,
            extra_args: None,
            model: None,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.target.trim().is_empty() {
            return Err(DomainError::InvalidRequest(
                "target language must not be empty".to_string(),
            ));
        }
        if self.segments.is_empty() {
            return Err(DomainError::InvalidRequest(
                "at least one segment is required".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for segment in &self.segments {
            if segment.id.trim().is_empty() {
                return Err(DomainError::InvalidRequest(
                    "segment id must not be empty".to_string(),
                ));
            }
            if segment.text.trim().is_empty() {
                return Err(DomainError::InvalidRequest(format!(
                    "segment '{}' has empty text",
                    segment.id
                )));
            }
            if !seen.insert(segment.id.as_str()) {
                return Err(DomainError::InvalidRequest(format!(
                    "duplicate segment id '{}'",
                    segment.id
                )));
            }
        }
        Ok(())
    }

    /// Rendered translation requirements, if any.
    pub fn requirements(&self) -> Option<String> {
        self.extra_args.as_ref().and_then(render_extra_args)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub target: String,
    pub segments: Vec<TranslateSegment>,
}

impl TranslateResponse {
    /// Reorder segments to match the request and drop ids that were not asked
    /// for. Fails with the missing ids when the model skipped any.
    pub fn realign(self, request: &TranslateRequest) -> Result<Self, DomainError> {
        let mut by_id: HashMap<String, String> = self
            .segments
            .into_iter()
            .map(|s| (s.id, s.text))
            .collect();

        let mut segments = Vec::with_capacity(request.segments.len());
        let mut missing = Vec::new();
        for wanted in &request.segments {
            match by_id.remove(&wanted.id) {
                Some(text) => segments.push(TranslateSegment::new(wanted.id.clone(), text)),
                None => missing.push(wanted.id.clone()),
            }
        }

        if !missing.is_empty() {
            return Err(DomainError::MissingSegments(missing));
        }

        let target = if self.target.trim().is_empty() {
            request.target.clone()
        } else {
            self.target
        };
        Ok(Self { target, segments })
    }
}

/// Render `extra_args` into a requirements line.
///
/// A string is used verbatim, an object with `style` becomes `Style: <style>`,
/// any other object becomes `key: value` pairs, anything else its JSON text.
pub fn render_extra_args(value: &Value) -> Option<String> {
    let rendered = match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Object(map) => match map.get("style") {
            Some(style) => format!("Style: {}", plain(style)),
            None => map
                .iter()
                .map(|(k, v)| format!("{}: {}", k, plain(v)))
                .collect::<Vec<_>>()
                .join(", "),
        },
        other => other.to_string(),
    };
    (!rendered.is_empty()).then_some(rendered)
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> TranslateRequest {
        TranslateRequest::new(
            "en",
            vec![
                TranslateSegment::new("s1", "你好"),
                TranslateSegment::new("s2", "世界"),
            ],
        )
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn empty_target_rejected() {
        let mut req = request();
        req.target = " ".into();
        assert!(matches!(req.validate(), Err(DomainError::InvalidRequest(_))));
    }

    #[test]
    fn empty_segments_rejected() {
        let req = TranslateRequest::new("en", vec![]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let req = TranslateRequest::new(
            "en",
            vec![TranslateSegment::new("a", "x"), TranslateSegment::new("a", "y")],
        );
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate segment id 'a'"));
    }

    #[test]
    fn empty_segment_text_rejected() {
        let req = TranslateRequest::new("en", vec![TranslateSegment::new("a", "")]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn extra_args_string_is_verbatim() {
        assert_eq!(
            render_extra_args(&json!("keep it casual")).as_deref(),
            Some("keep it casual")
        );
    }

    #[test]
    fn extra_args_style_object() {
        assert_eq!(
            render_extra_args(&json!({"style": "formal", "tone": "warm"})).as_deref(),
            Some("Style: formal")
        );
    }

    #[test]
    fn extra_args_other_object_lists_pairs() {
        assert_eq!(
            render_extra_args(&json!({"audience": "kids", "max": 3})).as_deref(),
            Some("audience: kids, max: 3")
        );
    }

    #[test]
    fn extra_args_scalars_and_null() {
        assert_eq!(render_extra_args(&json!(42)).as_deref(), Some("42"));
        assert_eq!(render_extra_args(&json!(null)), None);
        assert_eq!(render_extra_args(&json!("")), None);
    }

    #[test]
    fn realign_restores_request_order_and_drops_extras() {
        let response = TranslateResponse {
            target: "en".into(),
            segments: vec![
                TranslateSegment::new("s2", "world"),
                TranslateSegment::new("zz", "noise"),
                TranslateSegment::new("s1", "hello"),
            ],
        };
        let aligned = response.realign(&request()).unwrap();
        assert_eq!(
            aligned.segments,
            vec![
                TranslateSegment::new("s1", "hello"),
                TranslateSegment::new("s2", "world"),
            ]
        );
    }

    #[test]
    fn realign_reports_missing_ids() {
        let response = TranslateResponse {
            target: "en".into(),
            segments: vec![TranslateSegment::new("s1", "hello")],
        };
        let err = response.realign(&request()).unwrap_err();
        assert_eq!(err, DomainError::MissingSegments(vec!["s2".to_string()]));
    }

    #[test]
    fn realign_fills_blank_target_from_request() {
        let response = TranslateResponse {
            target: "".into(),
            segments: vec![
                TranslateSegment::new("s1", "hello"),
                TranslateSegment::new("s2", "world"),
            ],
        };
        assert_eq!(response.realign(&request()).unwrap().target, "en");
    }
}
