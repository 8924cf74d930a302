//! Provider configuration types (provider-neutral, serde-free).
//!
//! These types define the shape of provider settings without depending
//! on any serialization format (TOML, JSON, etc.). They are built once at
//! process start and handed to [`ProviderRegistry`] by value.

mod registry;
mod resolution;

pub use registry::{Credential, MissingCredential, ProviderBinding, ProviderRegistry};
pub use resolution::{InferenceRule, ModelTarget, alias_provider, infer_provider, resolve};

use std::collections::HashMap;
use std::fmt;

/// Supported chat-completion vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Provider {
    #[default]
    Qwen,
    DeepSeek,
    OpenAi,
    Kimi,
}

impl Provider {
    /// Every supported provider, in a stable order.
    pub const ALL: [Provider; 4] = [
        Provider::Qwen,
        Provider::DeepSeek,
        Provider::OpenAi,
        Provider::Kimi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Qwen => "qwen",
            Provider::DeepSeek => "deepseek",
            Provider::OpenAi => "openai",
            Provider::Kimi => "kimi",
        }
    }

    /// Built-in OpenAI-compatible endpoint.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Qwen => "https://dashscope.aliyuncs.com/compatible-mode/v1",
            Provider::DeepSeek => "https://api.deepseek.com/v1",
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Kimi => "https://api.moonshot.cn/v1",
        }
    }

    /// Model used when the caller names the provider but not a model.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Qwen => "qwen-turbo-latest",
            Provider::DeepSeek => "deepseek-chat",
            Provider::OpenAi => "gpt-4o",
            Provider::Kimi => "kimi-k2-0711-preview",
        }
    }

    /// Conventional environment variable holding the API key.
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Provider::Qwen => "QWEN_API_KEY",
            Provider::DeepSeek => "DEEPSEEK_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Kimi => "KIMI_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    /// Parses canonical names only; fuzzy matching lives in [`resolve`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "qwen" => Ok(Provider::Qwen),
            "deepseek" => Ok(Provider::DeepSeek),
            "openai" => Ok(Provider::OpenAi),
            "kimi" => Ok(Provider::Kimi),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Settings for a single provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Resolved API key, if any was configured.
    pub credential: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Model used when none is specified.
    pub default_model: String,
}

impl ProviderSettings {
    /// Built-in settings for `provider` without a credential.
    pub fn builtin(provider: Provider) -> Self {
        Self {
            credential: None,
            base_url: provider.default_base_url().to_string(),
            default_model: provider.default_model().to_string(),
        }
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }
}

/// Top-level provider configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Provider used for empty or unrecognised model specifiers.
    pub default: Provider,
    /// Per-provider settings. Missing entries fall back to built-ins.
    pub providers: HashMap<Provider, ProviderSettings>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            default: Provider::default(),
            providers: Provider::ALL
                .iter()
                .map(|p| (*p, ProviderSettings::builtin(*p)))
                .collect(),
        }
    }
}

impl ProviderConfig {
    /// Settings for `provider`, falling back to built-ins.
    pub fn settings(&self, provider: Provider) -> ProviderSettings {
        self.providers
            .get(&provider)
            .cloned()
            .unwrap_or_else(|| ProviderSettings::builtin(provider))
    }

    /// Set the credential for one provider (builder style).
    pub fn with_credential(mut self, provider: Provider, credential: impl Into<String>) -> Self {
        let settings = self.settings(provider).with_credential(credential);
        self.providers.insert(provider, settings);
        self
    }

    /// True when at least one provider has a non-empty credential.
    pub fn has_any_credential(&self) -> bool {
        Provider::ALL.iter().any(|p| {
            self.providers
                .get(p)
                .and_then(|s| s.credential.as_deref())
                .is_some_and(|c| !c.is_empty())
        })
    }
}
