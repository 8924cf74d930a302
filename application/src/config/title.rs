//! Auto-title settings.

/// Default title length in logical characters.
pub const DEFAULT_TITLE_MAX_CHARS: usize = 25;

/// Controls the detached title task dispatched after a first turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleConfig {
    pub enabled: bool,
    pub max_chars: usize,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_chars: DEFAULT_TITLE_MAX_CHARS,
        }
    }
}

impl TitleConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }
}
