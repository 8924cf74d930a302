//! Conversation domain.
//!
//! - [`entities::Conversation`]: a titled, owned conversation
//! - [`entities::Message`]: an immutable, store-ordered transcript entry
//! - [`entities::ChatMessage`]: the `{role, content}` form fed to providers

pub mod entities;
