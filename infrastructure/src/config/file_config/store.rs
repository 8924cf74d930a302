//! Transcript store configuration (`[store]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which transcript store backs the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStoreConfig {
    pub backend: StoreBackend,
    /// SQLite database file. Defaults to the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl FileStoreConfig {
    /// Database path, falling back to `$XDG_DATA_HOME/chatrelay/chatrelay.db`.
    pub fn database_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("chatrelay")
                .join("chatrelay.db")
        })
    }
}
