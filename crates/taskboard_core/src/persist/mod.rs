//! Snapshot persistence contracts and backends.
//!
//! # Responsibility
//! - Define the `SnapshotStore` seam `TaskStore` writes through.
//! - Keep file, SQLite and in-memory storage details out of the store.
//!
//! # Invariants
//! - A save always writes the complete board; there are no partial updates.
//! - `load` returns `Ok(None)` when nothing has been saved yet, which is not
//!   an error.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod document;
pub mod json_file;
pub mod memory;
pub mod sqlite;

pub use document::{BoardDocument, TaskRecord, CURRENT_SCHEMA_VERSION};
pub use json_file::JsonFileStore;
pub use memory::InMemorySnapshotStore;
pub use sqlite::SqliteSnapshotStore;

pub type PersistResult<T> = Result<T, PersistError>;

/// Failure while reading or writing a board snapshot.
#[derive(Debug)]
pub enum PersistError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Db(DbError),
    UnsupportedSchemaVersion { found: u32, supported: u32 },
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "snapshot io failed: {err}"),
            Self::Json(err) => write!(f, "snapshot json is invalid: {err}"),
            Self::Db(err) => write!(f, "snapshot db failed: {err}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "board schema version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<DbError> for PersistError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable home of the board snapshot.
pub trait SnapshotStore {
    /// Short backend name used in log events.
    fn backend(&self) -> &'static str;

    /// Reads the last saved document, or `None` when nothing was saved.
    fn load(&self) -> PersistResult<Option<BoardDocument>>;

    /// Replaces the stored document.
    fn save(&self, document: &BoardDocument) -> PersistResult<()>;

    /// Moves a snapshot that failed to load out of the way so the next save
    /// cannot overwrite it. Returns the new location when something moved.
    fn set_aside_unreadable(&self) -> PersistResult<Option<PathBuf>> {
        Ok(None)
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn backend(&self) -> &'static str {
        (**self).backend()
    }

    fn load(&self) -> PersistResult<Option<BoardDocument>> {
        (**self).load()
    }

    fn save(&self, document: &BoardDocument) -> PersistResult<()> {
        (**self).save(document)
    }

    fn set_aside_unreadable(&self) -> PersistResult<Option<PathBuf>> {
        (**self).set_aside_unreadable()
    }
}
