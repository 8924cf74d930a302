//! Transcript store adapters
//!
//! - [`InMemoryTranscriptStore`]: process-local, for tests and `--store memory`
//! - [`SqliteTranscriptStore`]: durable, one SQLite file

mod memory;
mod sqlite;

pub use memory::InMemoryTranscriptStore;
pub use sqlite::SqliteTranscriptStore;
