//! Runtime behavior (`[behavior]`) and auto-title (`[title]`) sections

use chatrelay_application::config::behavior::DEFAULT_RELAY_BUFFER;
use chatrelay_application::config::title::DEFAULT_TITLE_MAX_CHARS;
use chatrelay_application::{BehaviorConfig, TitleConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBehaviorConfig {
    /// Timeout in seconds for provider calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    /// Capacity of the provider-to-relay channel
    pub relay_buffer: usize,
}

impl Default for FileBehaviorConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: Some(120),
            relay_buffer: DEFAULT_RELAY_BUFFER,
        }
    }
}

impl FileBehaviorConfig {
    pub fn to_behavior_config(&self) -> BehaviorConfig {
        BehaviorConfig::from_timeout_seconds(self.timeout_seconds)
            .with_relay_buffer(self.relay_buffer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTitleConfig {
    /// Generate a title after a conversation's first turn
    pub enabled: bool,
    /// Title length bound in characters
    pub max_chars: usize,
}

impl Default for FileTitleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_chars: DEFAULT_TITLE_MAX_CHARS,
        }
    }
}

impl FileTitleConfig {
    pub fn to_title_config(&self) -> TitleConfig {
        TitleConfig {
            enabled: self.enabled,
            max_chars: self.max_chars,
        }
    }
}
