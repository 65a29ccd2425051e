//! SQLite-backed fast local cache channel.
//!
//! # Invariants
//! - The whole document lives in one row of `documents` keyed by slot.
//! - Saves are single-statement upserts, so a crash never leaves a torn row.

use super::{ChannelResult, PersistenceChannel};
use crate::db::{open_db, open_db_in_memory};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const CHANNEL_ID: &str = "sqlite";
const DEFAULT_SLOT: &str = "main";

/// Local document cache stored in a migrated SQLite file.
pub struct SqliteChannel {
    conn: Connection,
    slot: String,
}

impl SqliteChannel {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> ChannelResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    pub fn open_in_memory() -> ChannelResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            slot: DEFAULT_SLOT.to_string(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl PersistenceChannel for SqliteChannel {
    fn channel_id(&self) -> &str {
        CHANNEL_ID
    }

    fn load(&self) -> ChannelResult<Option<String>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE slot = ?1;",
                [self.slot.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(body)
    }

    fn save(&self, body: &str) -> ChannelResult<()> {
        self.conn.execute(
            "INSERT INTO documents (slot, body, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(slot) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at;",
            params![self.slot.as_str(), body],
        )?;
        Ok(())
    }
}
