//! Tolerant JSON parsing of model output.
//!
//! Models asked for "JSON only" still like to wrap it in a Markdown code
//! fence. [`parse_structured`] tries each [`ParseStrategy`] in order and
//! stops at the first one that deserializes.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// A way of turning raw model text into candidate JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// The text exactly as returned.
    Raw,
    /// Whitespace trimmed, one surrounding ```` ``` ```` fence removed.
    FenceStripped,
}

impl ParseStrategy {
    /// Attempt order. There is deliberately no third strategy.
    pub const ORDER: [ParseStrategy; 2] = [ParseStrategy::Raw, ParseStrategy::FenceStripped];

    pub fn apply<'a>(&self, raw: &'a str) -> &'a str {
        match self {
            ParseStrategy::Raw => raw,
            ParseStrategy::FenceStripped => strip_code_fence(raw),
        }
    }
}

/// Every strategy failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("model output is not valid JSON: {reason}")]
pub struct ExtractionFailure {
    /// Text after the last strategy was applied.
    pub cleaned: String,
    /// Deserializer message from the last attempt.
    pub reason: String,
}

/// Remove one leading fence line opener (```` ```json ````, ```` ```JSON ````
/// or bare ```` ``` ````) and one trailing ```` ``` ````, trimming around both.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Deserialize `raw` into `T`, trying [`ParseStrategy::ORDER`].
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, ExtractionFailure> {
    let mut failure = ExtractionFailure {
        cleaned: raw.to_string(),
        reason: String::new(),
    };

    for strategy in ParseStrategy::ORDER {
        let candidate = strategy.apply(raw);
        match serde_json::from_str::<T>(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => {
                failure = ExtractionFailure {
                    cleaned: candidate.to_string(),
                    reason: e.to_string(),
                };
            }
        }
    }

    Err(failure)
}
