//! Provider configuration from TOML (`[providers]` section)

use super::ConfigValidationError;
use chatrelay_domain::providers::alias_provider;
use chatrelay_domain::{Provider, ProviderConfig, ProviderSettings};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Settings for one OpenAI-compatible provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileProviderEntry {
    /// Environment variable name for the API key (e.g. "DEEPSEEK_API_KEY").
    pub api_key_env: String,
    /// Direct API key (prefer the env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Model used when the caller names the provider but no model.
    pub default_model: String,
}

impl FileProviderEntry {
    pub fn builtin(provider: Provider) -> Self {
        Self {
            api_key_env: provider.default_api_key_env().to_string(),
            api_key: None,
            base_url: provider.default_base_url().to_string(),
            default_model: provider.default_model().to_string(),
        }
    }

    /// Direct key if set, else the environment variable.
    fn resolve_credential(&self, env: &dyn Fn(&str) -> Option<String>) -> Option<String> {
        self.api_key
            .as_ref()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .or_else(|| {
                env(&self.api_key_env)
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
            })
    }
}

const REDACTED: &str = "********";

macro_rules! builtin_entry_default {
    ($name:ident, $provider:expr) => {
        fn $name() -> FileProviderEntry {
            FileProviderEntry::builtin($provider)
        }
    };
}

builtin_entry_default!(default_qwen, Provider::Qwen);
builtin_entry_default!(default_deepseek, Provider::DeepSeek);
builtin_entry_default!(default_openai, Provider::OpenAi);
builtin_entry_default!(default_kimi, Provider::Kimi);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Provider for empty or unrecognised model specifiers (default: "qwen").
    pub default: String,
    #[serde(default = "default_qwen")]
    pub qwen: FileProviderEntry,
    #[serde(default = "default_deepseek")]
    pub deepseek: FileProviderEntry,
    #[serde(default = "default_openai")]
    pub openai: FileProviderEntry,
    #[serde(default = "default_kimi")]
    pub kimi: FileProviderEntry,
}

impl Default for FileProvidersConfig {
    fn default() -> Self {
        Self {
            default: Provider::default().as_str().to_string(),
            qwen: default_qwen(),
            deepseek: default_deepseek(),
            openai: default_openai(),
            kimi: default_kimi(),
        }
    }
}

impl FileProvidersConfig {
    pub fn entry(&self, provider: Provider) -> &FileProviderEntry {
        match provider {
            Provider::Qwen => &self.qwen,
            Provider::DeepSeek => &self.deepseek,
            Provider::OpenAi => &self.openai,
            Provider::Kimi => &self.kimi,
        }
    }

    /// Copy with every direct `api_key` masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for entry in [
            &mut copy.qwen,
            &mut copy.deepseek,
            &mut copy.openai,
            &mut copy.kimi,
        ] {
            if entry.api_key.is_some() {
                entry.api_key = Some(REDACTED.to_string());
            }
        }
        copy
    }

    pub fn default_provider(&self) -> Result<Provider, ConfigValidationError> {
        alias_provider(&self.default)
            .ok_or_else(|| ConfigValidationError::UnknownProvider(self.default.clone()))
    }

    /// Build the runtime [`ProviderConfig`], resolving credentials once.
    pub fn to_provider_config(
        &self,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<ProviderConfig, ConfigValidationError> {
        let default = self.default_provider()?;
        let providers: HashMap<Provider, ProviderSettings> = Provider::ALL
            .into_iter()
            .map(|provider| {
                let entry = self.entry(provider);
                let settings = ProviderSettings {
                    credential: entry.resolve_credential(env),
                    base_url: entry.base_url.trim_end_matches('/').to_string(),
                    default_model: entry.default_model.clone(),
                };
                (provider, settings)
            })
            .collect();
        Ok(ProviderConfig { default, providers })
    }
}
