//! Translate use case.
//!
//! Translates a batch of id-addressed segments in one structured completion.

use crate::error::ErrorKind;
use crate::use_cases::extract::{ExtractError, StructuredExtractor};
use chatrelay_domain::{DomainError, PromptTemplate, TranslateRequest, TranslateResponse};
use thiserror::Error;
use tracing::info;

/// Errors that can occur during translation.
#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// The model's JSON parsed but did not cover every requested segment.
    #[error("{reason}")]
    Incomplete { reason: String, raw: String },
}

impl TranslateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranslateError::Validation(_) => ErrorKind::Validation,
            TranslateError::Extract(e) => e.kind(),
            TranslateError::Incomplete { .. } => ErrorKind::Extraction,
        }
    }

    pub fn raw_content(&self) -> Option<&str> {
        match self {
            TranslateError::Extract(e) => e.raw_content(),
            TranslateError::Incomplete { raw, .. } => Some(raw),
            TranslateError::Validation(_) => None,
        }
    }
}

/// Use case for segment translation
#[derive(Clone)]
pub struct TranslateUseCase {
    extractor: StructuredExtractor,
}

impl TranslateUseCase {
    pub fn new(extractor: StructuredExtractor) -> Self {
        Self { extractor }
    }

    pub async fn execute(
        &self,
        request: TranslateRequest,
    ) -> Result<TranslateResponse, TranslateError> {
        request
            .validate()
            .map_err(|e| TranslateError::Validation(e.to_string()))?;

        info!(
            "Translating {} segment(s) to {}",
            request.segments.len(),
            request.target
        );
        let requirements = request.requirements();
        let prompt =
            PromptTemplate::translate(&request.target, &request.segments, requirements.as_deref());

        let response: TranslateResponse = self
            .extractor
            .extract_with(
                &prompt,
                PromptTemplate::translate_shape(),
                request.model.as_deref(),
            )
            .await?;

        let raw = serde_json::to_string(&response).unwrap_or_default();
        response.realign(&request).map_err(|e| match e {
            DomainError::MissingSegments(_) => TranslateError::Incomplete {
                reason: e.to_string(),
                raw,
            },
            DomainError::InvalidRequest(msg) => TranslateError::Validation(msg),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{Script, ScriptedGateway};
    use chatrelay_domain::{Provider, ProviderConfig, ProviderRegistry, TranslateSegment};
    use std::sync::Arc;

    fn use_case(gateway: Arc<ScriptedGateway>) -> TranslateUseCase {
        let registry = Arc::new(ProviderRegistry::new(
            ProviderConfig::default().with_credential(Provider::Qwen, "q"),
        ));
        TranslateUseCase::new(StructuredExtractor::new(gateway, registry))
    }

    fn request() -> TranslateRequest {
        TranslateRequest::new(
            "en",
            vec![
                TranslateSegment::new("s1", "你好"),
                TranslateSegment::new("s2", "世界"),
            ],
        )
    }

    #[tokio::test]
    async fn fenced_response_is_parsed_and_realigned() {
        let reply = "```json\n{\"target\":\"en\",\"segments\":[{\"id\":\"s2\",\"text\":\"world\"},{\"id\":\"s1\",\"text\":\"hello\"}]}\n```";
        let gateway = Arc::new(ScriptedGateway::new(vec![Script::text(&[reply])]));

        let response = use_case(gateway.clone()).execute(request()).await.unwrap();

        assert_eq!(response.target, "en");
        assert_eq!(
            response.segments,
            vec![
                TranslateSegment::new("s1", "hello"),
                TranslateSegment::new("s2", "world"),
            ]
        );
        let prompt = &gateway.calls()[0].1[0].content;
        assert!(prompt.contains("Segment ID s1: 你好"));
    }

    #[tokio::test]
    async fn extra_args_reach_the_prompt() {
        let reply = r#"{"target":"en","segments":[{"id":"s1","text":"Hi"},{"id":"s2","text":"World"}]}"#;
        let gateway = Arc::new(ScriptedGateway::new(vec![Script::text(&[reply])]));
        let mut req = request();
        req.extra_args = Some(serde_json::json!({"style": "casual"}));

        use_case(gateway.clone()).execute(req).await.unwrap();

        assert!(gateway.calls()[0].1[0]
            .content
            .contains("Translation requirements: Style: casual"));
    }

    #[tokio::test]
    async fn invalid_request_never_calls_the_model() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let err = use_case(gateway.clone())
            .execute(TranslateRequest::new("", vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn prose_reply_is_an_extraction_error() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Script::text(&["Sorry, I can't"])]));
        let err = use_case(gateway).execute(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Extraction);
        assert_eq!(err.raw_content(), Some("Sorry, I can't"));
    }

    #[tokio::test]
    async fn missing_segment_is_an_extraction_error() {
        let reply = r#"{"target":"en","segments":[{"id":"s1","text":"hello"}]}"#;
        let gateway = Arc::new(ScriptedGateway::new(vec![Script::text(&[reply])]));
        let err = use_case(gateway).execute(request()).await.unwrap_err();
        assert!(matches!(err, TranslateError::Incomplete { .. }));
        assert_eq!(err.kind(), ErrorKind::Extraction);
        assert!(err.to_string().contains("s2"));
    }
}
