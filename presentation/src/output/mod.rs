//! Output formatting for command results and errors

pub mod console;
pub mod error;
