//! Application layer for chatrelay
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod error;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{BehaviorConfig, TitleConfig};
pub use error::ErrorKind;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{GatewayError, LlmGateway, StreamHandle},
    page_fetcher::{FetchError, NoPageFetcher, PageFetcher},
    relay_sink::{RelayClosed, RelaySink},
    transcript_store::{StoreError, TranscriptStore},
};
pub use use_cases::conversation::{ConversationError, ConversationHistory, ConversationService};
pub use use_cases::extract::{ExtractError, StructuredExtractor};
pub use use_cases::fetch_extract::{FetchExtractError, FetchExtractUseCase};
pub use use_cases::generate_title::{TitleError, TitleGenerator};
pub use use_cases::stream_turn::{
    StreamTurnInput, StreamTurnUseCase, TurnError, TurnFinish, TurnReport, TurnState,
};
pub use use_cases::translate::{TranslateError, TranslateUseCase};
