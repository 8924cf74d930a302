//! Structured extraction helper.
//!
//! Sends a prompt with a "JSON only" directive to a provider and parses the
//! reply with [`parse_structured`]: the raw text first, then once more with a
//! surrounding code fence stripped. There is no re-prompt.

use crate::error::ErrorKind;
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use chatrelay_domain::{ChatMessage, PromptTemplate, ProviderRegistry, parse_structured};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during structured extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("{0}")]
    Gateway(#[from] GatewayError),

    /// The model answered but the text is not the requested JSON shape.
    #[error("Failed to parse model output: {reason}")]
    Malformed { reason: String, raw: String },
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::Gateway(e) => e.kind(),
            ExtractError::Malformed { .. } => ErrorKind::Extraction,
        }
    }

    /// Cleaned model output, when parsing was the failure.
    pub fn raw_content(&self) -> Option<&str> {
        match self {
            ExtractError::Malformed { raw, .. } => Some(raw),
            ExtractError::Gateway(_) => None,
        }
    }
}

/// Runs one-shot structured completions.
#[derive(Clone)]
pub struct StructuredExtractor {
    gateway: Arc<dyn LlmGateway>,
    registry: Arc<ProviderRegistry>,
}

impl StructuredExtractor {
    pub fn new(gateway: Arc<dyn LlmGateway>, registry: Arc<ProviderRegistry>) -> Self {
        Self { gateway, registry }
    }

    /// Extract a `T` using the default provider.
    pub async fn extract<T: DeserializeOwned>(
        &self,
        prompt: &str,
        shape: &str,
    ) -> Result<T, ExtractError> {
        self.extract_with(prompt, shape, None).await
    }

    /// Extract a `T` using `model` (a model specifier) or the default provider.
    pub async fn extract_with<T: DeserializeOwned>(
        &self,
        prompt: &str,
        shape: &str,
        model: Option<&str>,
    ) -> Result<T, ExtractError> {
        let target = self.registry.resolve(model.unwrap_or(""));
        let full_prompt = format!("{}{}", prompt, PromptTemplate::json_only(shape));
        debug!("Structured extraction via {}", target);

        let raw = self
            .gateway
            .complete(&target, &[ChatMessage::user(full_prompt)])
            .await?;

        parse_structured(&raw).map_err(|failure| {
            warn!("Model output was not valid JSON: {}", failure.reason);
            ExtractError::Malformed {
                reason: failure.reason,
                raw: failure.cleaned,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{Script, ScriptedGateway};
    use chatrelay_domain::{Provider, ProviderConfig};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Shape {
        a: i32,
    }

    fn extractor(gateway: Arc<ScriptedGateway>) -> StructuredExtractor {
        let registry = Arc::new(ProviderRegistry::new(
            ProviderConfig::default().with_credential(Provider::Qwen, "q"),
        ));
        StructuredExtractor::new(gateway, registry)
    }

    #[tokio::test]
    async fn fenced_output_parses() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Script::text(&[
            "```json\n{\"a\":",
            "1}\n```",
        ])]));
        let value: Shape = extractor(gateway.clone())
            .extract("give me a", "{\"a\": 0}")
            .await
            .unwrap();
        assert_eq!(value, Shape { a: 1 });

        let (target, history) = &gateway.calls()[0];
        assert_eq!(target.provider, Provider::Qwen);
        assert!(history[0].content.starts_with("give me a"));
        assert!(history[0].content.contains("Return only the JSON"));
    }

    #[tokio::test]
    async fn prose_output_is_malformed_with_raw_text() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Script::text(&["Sorry, I can't"])]));
        let err = extractor(gateway)
            .extract::<Shape>("p", "{}")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Extraction);
        assert_eq!(err.raw_content(), Some("Sorry, I can't"));
    }

    #[tokio::test]
    async fn gateway_failure_passes_through() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Script::OpenError(
            GatewayError::Timeout,
        )]));
        let err = extractor(gateway)
            .extract::<Shape>("p", "{}")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
        assert_eq!(err.raw_content(), None);
    }

    #[tokio::test]
    async fn explicit_model_is_resolved() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Script::text(&["{\"a\":2}"])]));
        let _: Shape = extractor(gateway.clone())
            .extract_with("p", "{}", Some("gpt-4o-mini"))
            .await
            .unwrap();
        assert_eq!(gateway.calls()[0].0.provider, Provider::OpenAi);
    }
}
