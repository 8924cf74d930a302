//! Provider registry: model resolution plus credential lookup.

use super::resolution::{self, ModelTarget};
use super::{Provider, ProviderConfig};
use thiserror::Error;

/// No credential was configured for a provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No API credential configured for provider '{0}'")]
pub struct MissingCredential(pub Provider);

/// An API key. `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Everything a transport needs to reach one provider for one call.
///
/// Computed fresh on every request and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderBinding {
    pub provider: Provider,
    pub model: String,
    pub credential: Credential,
    pub base_url: String,
}

/// Maps model specifiers to providers and providers to credentials.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    config: ProviderConfig,
}

impl ProviderRegistry {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn default_provider(&self) -> Provider {
        self.config.default
    }

    /// Resolve a model specifier. See [`resolution::resolve`].
    pub fn resolve(&self, spec: &str) -> ModelTarget {
        resolution::resolve(spec, &self.config)
    }

    /// Credential for `provider`, or [`MissingCredential`].
    pub fn credential_for(&self, provider: Provider) -> Result<Credential, MissingCredential> {
        self.config
            .providers
            .get(&provider)
            .and_then(|s| s.credential.as_deref())
            .filter(|c| !c.is_empty())
            .map(Credential::new)
            .ok_or(MissingCredential(provider))
    }

    /// Combine a target with its credential and endpoint.
    pub fn bind(&self, target: &ModelTarget) -> Result<ProviderBinding, MissingCredential> {
        let credential = self.credential_for(target.provider)?;
        let settings = self.config.settings(target.provider);
        let model = if target.model.is_empty() {
            settings.default_model
        } else {
            target.model.clone()
        };
        Ok(ProviderBinding {
            provider: target.provider,
            model,
            credential,
            base_url: settings.base_url,
        })
    }

    /// Providers with a usable credential, in [`Provider::ALL`] order.
    pub fn configured_providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.credential_for(*p).is_ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_for_missing_provider_fails() {
        let registry = ProviderRegistry::new(ProviderConfig::default());
        assert_eq!(
            registry.credential_for(Provider::DeepSeek),
            Err(MissingCredential(Provider::DeepSeek))
        );
    }

    #[test]
    fn bind_fills_endpoint_and_credential() {
        let config = ProviderConfig::default().with_credential(Provider::DeepSeek, "sk-ds");
        let registry = ProviderRegistry::new(config);
        let target = registry.resolve("deepseek/deepseek-reasoner");
        let binding = registry.bind(&target).unwrap();
        assert_eq!(binding.provider, Provider::DeepSeek);
        assert_eq!(binding.model, "deepseek-reasoner");
        assert_eq!(binding.base_url, "https://api.deepseek.com/v1");
        assert_eq!(binding.credential.expose(), "sk-ds");
    }

    #[test]
    fn bind_without_model_uses_default_model() {
        let config = ProviderConfig::default().with_credential(Provider::Qwen, "sk-q");
        let registry = ProviderRegistry::new(config);
        let binding = registry.bind(&ModelTarget::new(Provider::Qwen, "")).unwrap();
        assert_eq!(binding.model, "qwen-turbo-latest");
    }

    #[test]
    fn resolve_succeeds_even_without_credentials() {
        let registry = ProviderRegistry::new(ProviderConfig::default());
        let target = registry.resolve("gpt-4o");
        assert_eq!(target.provider, Provider::OpenAi);
        assert!(registry.bind(&target).is_err());
    }

    #[test]
    fn credential_debug_is_redacted() {
        let credential = Credential::new("sk-secret");
        assert_eq!(format!("{:?}", credential), "Credential(***)");
    }

    #[test]
    fn configured_providers_lists_only_keyed_providers() {
        let config = ProviderConfig::default()
            .with_credential(Provider::Kimi, "k")
            .with_credential(Provider::Qwen, "q");
        let registry = ProviderRegistry::new(config);
        assert_eq!(
            registry.configured_providers(),
            vec![Provider::Qwen, Provider::Kimi]
        );
    }
}
