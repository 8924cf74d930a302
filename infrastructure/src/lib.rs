//! Infrastructure layer for chatrelay
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod fetch;
pub mod logging;
pub mod providers;
pub mod store;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileBehaviorConfig, FileConfig, FileLoggingConfig,
    FileProviderEntry, FileProvidersConfig, FileStoreConfig, FileTitleConfig, StoreBackend,
};
#[cfg(feature = "web-tools")]
pub use fetch::HttpPageFetcher;
pub use fetch::default_page_fetcher;
pub use logging::JsonlConversationLogger;
pub use providers::OpenAiCompatGateway;
pub use store::{InMemoryTranscriptStore, SqliteTranscriptStore};
