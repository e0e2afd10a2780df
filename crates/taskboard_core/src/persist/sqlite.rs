//! SQLite key-value snapshot store.
//!
//! # Responsibility
//! - Keep the board document as one row keyed by `slot`.
//! - Retain a short history of replaced documents for manual recovery.
//!
//! # Invariants
//! - Replace-and-archive happens in one transaction.
//! - History keeps at most `HISTORY_LIMIT` rows per slot.

use crate::db::{open_db, open_db_in_memory};
use crate::persist::{BoardDocument, PersistResult, SnapshotStore};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Slot used when the caller does not choose one.
pub const DEFAULT_SLOT: &str = "all-tasks";

/// Replaced documents kept per slot.
pub const HISTORY_LIMIT: u32 = 5;

/// Board snapshot stored in a SQLite `board_snapshots` row.
pub struct SqliteSnapshotStore {
    conn: Connection,
    slot: String,
}

impl SqliteSnapshotStore {
    /// Opens the database file, applying migrations first.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        Ok(Self::with_connection(open_db(path)?))
    }

    pub fn open_in_memory() -> PersistResult<Self> {
        Ok(Self::with_connection(open_db_in_memory()?))
    }

    /// Wraps a connection that already has migrations applied.
    pub fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            slot: DEFAULT_SLOT.to_string(),
        }
    }

    /// Uses another slot, e.g. one board per profile.
    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = slot.into();
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Previously replaced documents, newest first.
    pub fn history(&self, limit: u32) -> PersistResult<Vec<BoardDocument>> {
        let mut stmt = self.conn.prepare(
            "SELECT document
             FROM board_snapshot_history
             WHERE slot = ?1
             ORDER BY id DESC
             LIMIT ?2;",
        )?;
        let mut rows = stmt.query(params![self.slot, limit])?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            documents.push(serde_json::from_str(&text)?);
        }
        Ok(documents)
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn load(&self) -> PersistResult<Option<BoardDocument>> {
        let text: Option<String> = self
            .conn
            .query_row(
                "SELECT document FROM board_snapshots WHERE slot = ?1;",
                [self.slot.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match text {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn save(&self, document: &BoardDocument) -> PersistResult<()> {
        let text = serde_json::to_string(document)?;
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO board_snapshot_history (slot, schema_version, document, saved_at)
             SELECT slot, schema_version, document, updated_at
             FROM board_snapshots
             WHERE slot = ?1;",
            [self.slot.as_str()],
        )?;
        tx.execute(
            "INSERT INTO board_snapshots (slot, schema_version, document, updated_at)
             VALUES (?1, ?2, ?3, CAST(strftime('%s', 'now') AS INTEGER) * 1000)
             ON CONFLICT(slot) DO UPDATE SET
                schema_version = excluded.schema_version,
                document = excluded.document,
                updated_at = excluded.updated_at;",
            params![self.slot, document.schema_version, text],
        )?;
        tx.execute(
            "DELETE FROM board_snapshot_history
             WHERE slot = ?1
               AND id NOT IN (
                   SELECT id FROM board_snapshot_history
                   WHERE slot = ?1
                   ORDER BY id DESC
                   LIMIT ?2
               );",
            params![self.slot, HISTORY_LIMIT],
        )?;
        tx.commit()?;
        Ok(())
    }
}
