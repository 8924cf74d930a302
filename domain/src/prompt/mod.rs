//! Prompt domain
//!
//! Templates for the one-shot completions: conversation titles, segment
//! translation and web page extraction.

mod template;

pub use template::PromptTemplate;
