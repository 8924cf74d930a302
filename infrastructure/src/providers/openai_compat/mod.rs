//! OpenAI-compatible provider adapter
//!
//! - [`protocol`]: request and response bodies
//! - [`sse`]: `text/event-stream` decoding
//! - [`gateway`]: the [`LlmGateway`](chatrelay_application::LlmGateway) implementation

pub mod gateway;
pub mod protocol;
pub mod sse;

pub use gateway::OpenAiCompatGateway;
