//! Use cases (application services)
//!
//! Each use case owns its ports as `Arc<dyn Port>` and exposes an `execute`
//! style entry point returning a use-case specific error.

pub mod conversation;
pub mod extract;
pub mod fetch_extract;
pub mod generate_title;
pub mod stream_turn;
pub mod translate;

#[cfg(test)]
pub(crate) mod test_support;
