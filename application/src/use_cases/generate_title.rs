//! Title generation for a conversation's first exchange.
//!
//! Runs detached from the turn that triggered it: nobody awaits the result,
//! so every failure is logged and swallowed by [`TitleGenerator::run`].

use crate::config::TitleConfig;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, events,
};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::transcript_store::{StoreError, TranscriptStore};
use chatrelay_domain::util::truncate_chars;
use chatrelay_domain::{ChatMessage, ConversationId, PromptTemplate, ProviderRegistry};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while generating a title.
#[derive(Error, Debug)]
pub enum TitleError {
    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Model returned an empty title")]
    EmptyTitle,
}

/// Generates and stores a short conversation title.
#[derive(Clone)]
pub struct TitleGenerator {
    gateway: Arc<dyn LlmGateway>,
    store: Arc<dyn TranscriptStore>,
    registry: Arc<ProviderRegistry>,
    conversation_logger: Arc<dyn ConversationLogger>,
    max_chars: usize,
}

impl TitleGenerator {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        store: Arc<dyn TranscriptStore>,
        registry: Arc<ProviderRegistry>,
        config: &TitleConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            registry,
            conversation_logger: Arc::new(NoConversationLogger),
            max_chars: config.max_chars,
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Generate a title and write it to the conversation.
    pub async fn generate(
        &self,
        conversation_id: &ConversationId,
        first_user: &str,
        assistant: &str,
    ) -> Result<String, TitleError> {
        let target = self.registry.resolve("");
        debug!(
            "Generating title for {} with {}",
            conversation_id, target
        );
        let prompt = PromptTemplate::title(first_user, assistant, self.max_chars);
        let raw = self
            .gateway
            .complete(&target, &[ChatMessage::user(prompt)])
            .await?;

        let title = truncate_chars(raw.trim(), self.max_chars).trim_end().to_string();
        if title.is_empty() {
            return Err(TitleError::EmptyTitle);
        }

        let mut conversation = self
            .store
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(conversation_id.clone()))?;
        conversation.retitle(title.clone());
        self.store.update_conversation(&conversation).await?;

        Ok(title)
    }

    /// [`generate`](Self::generate), logging instead of returning failures.
    pub async fn run(&self, conversation_id: ConversationId, first_user: String, assistant: String) {
        match self.generate(&conversation_id, &first_user, &assistant).await {
            Ok(title) => {
                info!("Conversation {} titled '{}'", conversation_id, title);
                self.conversation_logger.log(ConversationEvent::new(
                    events::TITLE_GENERATED,
                    json!({
                        "conversation_id": conversation_id.as_str(),
                        "title": title,
                    }),
                ));
            }
            Err(e) => {
                warn!("Title generation failed for {}: {}", conversation_id, e);
                self.conversation_logger.log(ConversationEvent::new(
                    events::TITLE_FAILED,
                    json!({
                        "conversation_id": conversation_id.as_str(),
                        "error": e.to_string(),
                    }),
                ));
            }
        }
    }
}
