//! Runtime behavior of the use cases.

use std::time::Duration;

/// Default capacity of relay and stream channels.
pub const DEFAULT_RELAY_BUFFER: usize = 64;

/// Application behavior configuration.
///
/// Controls runtime behavior of use cases like timeout limits for LLM API calls.
#[derive(Debug, Clone)]
pub struct BehaviorConfig {
    /// Maximum time to wait for a provider to respond before timing out.
    pub timeout: Option<Duration>,
    /// Capacity of the channel between the provider reader and the relay.
    pub relay_buffer: usize,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            relay_buffer: DEFAULT_RELAY_BUFFER,
        }
    }
}

impl BehaviorConfig {
    /// Creates a BehaviorConfig with a timeout specified in seconds.
    pub fn with_timeout_seconds(seconds: u64) -> Self {
        Self::from_timeout_seconds(Some(seconds))
    }

    /// Creates a BehaviorConfig from an optional timeout in seconds.
    ///
    /// If `seconds` is `None`, no timeout is applied.
    pub fn from_timeout_seconds(seconds: Option<u64>) -> Self {
        Self {
            timeout: seconds.map(Duration::from_secs),
            ..Default::default()
        }
    }

    pub fn with_relay_buffer(mut self, relay_buffer: usize) -> Self {
        self.relay_buffer = relay_buffer.max(1);
        self
    }
}
