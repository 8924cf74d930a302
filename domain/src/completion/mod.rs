//! Chat completion domain.
//!
//! - [`stream::StreamEvent`]: one event of a streaming completion

pub mod stream;
