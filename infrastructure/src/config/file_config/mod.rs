//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain/application
//! types once at startup.

mod behavior;
mod logging;
mod providers;
mod store;

pub use behavior::{FileBehaviorConfig, FileTitleConfig};
pub use logging::FileLoggingConfig;
pub use providers::{FileProviderEntry, FileProvidersConfig};
pub use store::{FileStoreConfig, StoreBackend};

use chatrelay_domain::Provider;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("unknown provider '{0}' in providers.default")]
    UnknownProvider(String),

    #[error("providers.{provider}.{field} must not be empty")]
    EmptyProviderField {
        provider: Provider,
        field: &'static str,
    },

    #[error("providers.{provider}.base_url must start with http:// or https://, got '{value}'")]
    InvalidBaseUrl { provider: Provider, value: String },

    #[error("behavior.timeout_seconds must be greater than 0")]
    InvalidTimeout,

    #[error("behavior.relay_buffer must be greater than 0")]
    InvalidRelayBuffer,

    #[error("title.max_chars must be greater than 0")]
    InvalidTitleLength,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Provider endpoints, credentials and the fallback provider
    pub providers: FileProvidersConfig,
    /// Transcript store backend
    pub store: FileStoreConfig,
    /// Auto-title settings
    pub title: FileTitleConfig,
    /// Timeouts and relay buffering
    pub behavior: FileBehaviorConfig,
    /// Log destinations
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.providers.default_provider()?;

        for provider in Provider::ALL {
            let entry = self.providers.entry(provider);
            let base_url = entry.base_url.trim();
            if base_url.is_empty() {
                return Err(ConfigValidationError::EmptyProviderField {
                    provider,
                    field: "base_url",
                });
            }
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(ConfigValidationError::InvalidBaseUrl {
                    provider,
                    value: entry.base_url.clone(),
                });
            }
            if entry.default_model.trim().is_empty() {
                return Err(ConfigValidationError::EmptyProviderField {
                    provider,
                    field: "default_model",
                });
            }
        }

        if self.behavior.timeout_seconds == Some(0) {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.behavior.relay_buffer == 0 {
            return Err(ConfigValidationError::InvalidRelayBuffer);
        }
        if self.title.max_chars == 0 {
            return Err(ConfigValidationError::InvalidTitleLength);
        }

        Ok(())
    }

    /// Render as TOML with direct API keys masked.
    pub fn to_redacted_toml(&self) -> Result<String, toml::ser::Error> {
        let shown = FileConfig {
            providers: self.providers.redacted(),
            ..self.clone()
        };
        toml::to_string_pretty(&shown)
    }
}
