//! Structured extraction from free-form model output.

mod directive;
mod parsing;

pub use directive::ExtractionDirective;
pub use parsing::{ExtractionFailure, ParseStrategy, parse_structured, strip_code_fence};
