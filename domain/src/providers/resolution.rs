//! Model specifier resolution.
//!
//! Turns a free-form, user-supplied model specifier into a concrete
//! [`ModelTarget`]. Resolution is total: anything it cannot make sense of
//! degrades to the configured default provider.
//!
//! Accepted forms:
//!
//! | Input | Result |
//! |-------|--------|
//! | `""` | default provider, its default model |
//! | `"deepseek/deepseek-reasoner"` | alias lookup on the hint, model as given |
//! | `"foo/gpt-4o-mini"` | unknown hint, inference on the model name |
//! | `"kimi-latest"` | inference on the whole string |

use super::{Provider, ProviderConfig};

/// Separator between a provider hint and a model name.
const HINT_SEPARATOR: char = '/';

/// Provider hints, matched case-insensitively against the whole hint.
const ALIASES: &[(&str, Provider)] = &[
    ("qwen", Provider::Qwen),
    ("通义千问", Provider::Qwen),
    ("通义", Provider::Qwen),
    ("deepseek", Provider::DeepSeek),
    ("深度求索", Provider::DeepSeek),
    ("openai", Provider::OpenAi),
    ("open ai", Provider::OpenAi),
    ("gpt", Provider::OpenAi),
    ("kimi", Provider::Kimi),
    ("moonshot", Provider::Kimi),
    ("月之暗面", Provider::Kimi),
    ("月之", Provider::Kimi),
];

/// A name-inference rule: the provider wins when any token is a substring
/// of the lowercased model name.
#[derive(Debug, Clone, Copy)]
pub struct InferenceRule {
    pub tokens: &'static [&'static str],
    pub provider: Provider,
}

impl InferenceRule {
    pub fn matches(&self, lowered: &str) -> bool {
        self.tokens.iter().any(|t| lowered.contains(t))
    }
}

/// Ordered inference rules; the first match wins.
pub const INFERENCE_RULES: &[InferenceRule] = &[
    InferenceRule {
        tokens: &["qwen", "通义"],
        provider: Provider::Qwen,
    },
    InferenceRule {
        tokens: &["deepseek"],
        provider: Provider::DeepSeek,
    },
    InferenceRule {
        tokens: &["gpt"],
        provider: Provider::OpenAi,
    },
    InferenceRule {
        tokens: &["kimi"],
        provider: Provider::Kimi,
    },
];

/// A resolved provider and concrete model name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTarget {
    pub provider: Provider,
    pub model: String,
}

impl ModelTarget {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

impl std::fmt::Display for ModelTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// Look up a provider hint in the alias table.
pub fn alias_provider(hint: &str) -> Option<Provider> {
    let lowered = hint.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, provider)| *provider)
}

/// Infer a provider from a model name using [`INFERENCE_RULES`].
pub fn infer_provider(model: &str) -> Option<Provider> {
    let lowered = model.to_lowercase();
    INFERENCE_RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.provider)
}

/// Resolve a model specifier. Never fails.
pub fn resolve(spec: &str, config: &ProviderConfig) -> ModelTarget {
    let spec = spec.trim();
    let default_model_for = |provider: Provider| config.settings(provider).default_model;

    if spec.is_empty() {
        return ModelTarget::new(config.default, default_model_for(config.default));
    }

    // Only the segment after the first separator names the model; any further
    // segments are ignored.
    let mut parts = spec.split(HINT_SEPARATOR);
    let hint = parts.next().unwrap_or_default();
    let (provider, model) = match parts.next() {
        Some(model) => {
            let model = model.trim();
            let provider = alias_provider(hint)
                .or_else(|| infer_provider(model))
                .unwrap_or(config.default);
            (provider, model)
        }
        None => (infer_provider(spec).unwrap_or(config.default), spec),
    };

    if model.is_empty() {
        ModelTarget::new(provider, default_model_for(provider))
    } else {
        ModelTarget::new(provider, model)
    }
}
