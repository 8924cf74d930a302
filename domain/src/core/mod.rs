//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`string::preview_line`]: one-line previews with ellipsis

pub mod error;
pub mod string;
