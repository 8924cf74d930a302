//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`BehaviorConfig`]: provider timeouts and relay buffering
//! - [`TitleConfig`]: auto-title task on/off and length bound

pub mod behavior;
pub mod title;

pub use behavior::BehaviorConfig;
pub use title::TitleConfig;
