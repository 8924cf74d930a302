//! Domain layer for chatrelay
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Conversations
//!
//! A [`Conversation`] owns an ordered transcript of [`Message`]s. Messages are
//! immutable once stored; the title starts empty and is filled in after the
//! first exchange.
//!
//! ## Providers
//!
//! Every model specifier resolves to exactly one [`Provider`] through
//! [`ProviderRegistry::resolve`], which never fails. Credentials are looked up
//! separately, at call time.
//!
//! ## Relay
//!
//! Streamed turns are pushed to the caller as [`RelayFrame`]s carrying
//! OpenAI-style `chat.completion.chunk` payloads.
//!
//! ## Extraction
//!
//! [`parse_structured`] turns "JSON only" model output into typed values,
//! tolerating a Markdown code fence.

pub mod completion;
pub mod conversation;
pub mod core;
pub mod extraction;
pub mod fetch;
pub mod prompt;
pub mod providers;
pub mod relay;
pub mod translation;
pub mod util;

// Re-export commonly used types
pub use completion::stream::StreamEvent;
pub use conversation::entities::{
    ChatMessage, Conversation, ConversationId, Message, MessageId, NewMessage, Role,
    to_chat_history,
};
pub use core::error::DomainError;
pub use extraction::{
    ExtractionDirective, ExtractionFailure, ParseStrategy, parse_structured, strip_code_fence,
};
pub use fetch::{FetchRequest, FetchResponse, FetchedPage, default_extract_fields};
pub use prompt::PromptTemplate;
pub use providers::{
    Credential, MissingCredential, ModelTarget, Provider, ProviderBinding, ProviderConfig,
    ProviderRegistry, ProviderSettings,
};
pub use relay::{ChatCompletionChunk, ChunkDelta, ChunkHeader, RelayFrame};
pub use translation::{TranslateRequest, TranslateResponse, TranslateSegment, render_extra_args};
