//! Presentation layer for chatrelay
//!
//! This crate contains the CLI definition, relay sinks that render a streamed
//! turn (SSE text or plain console), and output formatters.

pub mod cli;
pub mod output;
pub mod relay;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, OutputFormat, StoreChoice};
pub use output::console::ConsoleFormatter;
pub use output::error::{ErrorPayload, ReportedError};
pub use relay::console::ConsoleRelaySink;
pub use relay::sse::{SseRelaySink, encode_frame};
