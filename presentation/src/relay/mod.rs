//! Relay sinks for the CLI
//!
//! - [`sse`]: frames as `text/event-stream`, the same bytes an HTTP client
//!   would receive
//! - [`console`]: only the assistant text, for humans

pub mod console;
pub mod sse;
