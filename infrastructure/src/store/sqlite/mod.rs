//! SQLite transcript store.
//!
//! A single rusqlite [`Connection`] behind a `Mutex`, configured for WAL and
//! foreign keys. Every call runs on the blocking pool so the async runtime
//! never waits on disk I/O.

mod migrations;

use async_trait::async_trait;
use chatrelay_application::ports::transcript_store::{StoreError, TranscriptStore};
use chatrelay_domain::{Conversation, ConversationId, Message, MessageId, NewMessage, Role};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

const PRAGMAS: &str = "PRAGMA journal_mode = WAL;
     PRAGMA synchronous = NORMAL;
     PRAGMA foreign_keys = ON;";

/// Durable transcript store backed by one SQLite file.
#[derive(Clone)]
pub struct SqliteTranscriptStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTranscriptStore {
    /// Open (or create) a database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Backend(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| StoreError::Backend(format!("Failed to open database: {}", e)))?;
        let store = Self::init(conn)?;
        info!("Transcript database opened at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Backend(format!("Failed to open in-memory db: {}", e)))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(PRAGMAS)
            .map_err(|e| StoreError::Backend(format!("Failed to set pragmas: {}", e)))?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|e| StoreError::Backend(format!("Database lock poisoned: {}", e)))?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("Store task failed: {}", e)))?
    }

    /// Remove a conversation; its messages go with it (`ON DELETE CASCADE`).
    pub async fn delete_conversation(&self, id: &ConversationId) -> Result<(), StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let removed = conn
                .execute("DELETE FROM conversations WHERE id = ?1", params![id.as_str()])
                .map_err(backend)?;
            if removed == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn to_micros(at: &DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

fn from_micros(micros: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| StoreError::Backend(format!("invalid timestamp: {}", micros)))
}

/// Round-trip a timestamp through storage precision.
fn normalize(at: &DateTime<Utc>) -> Result<DateTime<Utc>, StoreError> {
    from_micros(to_micros(at))
}

fn conversation_exists(conn: &Connection, id: &ConversationId) -> Result<bool, StoreError> {
    conn.query_row(
        "SELECT 1 FROM conversations WHERE id = ?1",
        params![id.as_str()],
        |_| Ok(()),
    )
    .optional()
    .map(|row| row.is_some())
    .map_err(backend)
}

#[async_trait]
impl TranscriptStore for SqliteTranscriptStore {
    async fn create_conversation(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let conversation = conversation.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO conversations (id, title, owner, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    conversation.id.as_str(),
                    conversation.title,
                    conversation.owner,
                    to_micros(&conversation.created_at),
                    to_micros(&conversation.updated_at),
                ],
            )
            .map_err(backend)?;
            Ok(())
        })
        .await
    }

    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    "SELECT title, owner, created_at, updated_at
                     FROM conversations WHERE id = ?1",
                    params![id.as_str()],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, Option<String>>(1)?,
                            row.get::<_, i64>(2)?,
                            row.get::<_, i64>(3)?,
                        ))
                    },
                )
                .optional()
                .map_err(backend)?;

            row.map(|(title, owner, created_at, updated_at)| {
                Ok(Conversation {
                    id: id.clone(),
                    title,
                    owner,
                    created_at: from_micros(created_at)?,
                    updated_at: from_micros(updated_at)?,
                })
            })
            .transpose()
        })
        .await
    }

    async fn update_conversation(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let conversation = conversation.clone();
        self.with_conn(move |conn| {
            let updated = conn
                .execute(
                    "UPDATE conversations SET title = ?2, updated_at = ?3 WHERE id = ?1",
                    params![
                        conversation.id.as_str(),
                        conversation.title,
                        to_micros(&conversation.updated_at),
                    ],
                )
                .map_err(backend)?;
            if updated == 0 {
                return Err(StoreError::NotFound(conversation.id));
            }
            Ok(())
        })
        .await
    }

    async fn append_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        self.with_conn(move |conn| {
            if !conversation_exists(conn, &message.conversation_id)? {
                return Err(StoreError::NotFound(message.conversation_id));
            }
            conn.execute(
                "INSERT INTO messages (conversation_id, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    message.conversation_id.as_str(),
                    message.role.as_str(),
                    message.content,
                    to_micros(&message.created_at),
                ],
            )
            .map_err(backend)?;
            let id = MessageId(conn.last_insert_rowid());
            let created_at = normalize(&message.created_at)?;
            Ok(NewMessage {
                created_at,
                ..message
            }
            .into_message(id))
        })
        .await
    }

    async fn list_messages(&self, id: &ConversationId) -> Result<Vec<Message>, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, role, content, created_at FROM messages
                     WHERE conversation_id = ?1
                     ORDER BY created_at ASC, id ASC",
                )
                .map_err(backend)?;
            let rows = stmt
                .query_map(params![id.as_str()], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                })
                .map_err(backend)?;

            let mut messages = Vec::new();
            for row in rows {
                let (message_id, role, content, created_at) = row.map_err(backend)?;
                let role: Role = role.parse().map_err(StoreError::Backend)?;
                messages.push(Message {
                    id: MessageId(message_id),
                    conversation_id: id.clone(),
                    role,
                    content,
                    created_at: from_micros(created_at)?,
                });
            }
            Ok(messages)
        })
        .await
    }
}
