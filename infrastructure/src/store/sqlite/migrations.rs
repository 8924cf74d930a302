//! Database schema migrations.

use chatrelay_application::ports::transcript_store::StoreError;
use rusqlite::Connection;
use tracing::info;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| StoreError::Backend(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| StoreError::Backend(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: transcripts");
    }

    Ok(())
}

/// Version 1: conversations and messages. Timestamps are Unix microseconds.
fn apply_v1(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS conversations (
            id          TEXT PRIMARY KEY NOT NULL,
            title       TEXT NOT NULL DEFAULT '',
            owner       TEXT,
            created_at  INTEGER NOT NULL,
            updated_at  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS messages (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            conversation_id TEXT NOT NULL
                            REFERENCES conversations (id) ON DELETE CASCADE,
            role            TEXT NOT NULL
                            CHECK (role IN ('system', 'user', 'assistant')),
            content         TEXT NOT NULL,
            created_at      INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_conversation
            ON messages (conversation_id, created_at, id);

        INSERT INTO schema_migrations (version, name) VALUES (1, 'transcripts');
        ",
    )
    .map_err(|e| StoreError::Backend(format!("Migration v1 failed: {}", e)))
}
