//! Core state model for the task board.
//! This crate is the single source of truth for board invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod persist;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{BoardConfig, ConfigOverrides, StorageBackend};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::collection::TaskCollection;
pub use model::deadline::DeadlineState;
pub use model::task::{Task, TaskId, TaskStatus, TaskValidationError};
pub use persist::document::parse_deadline_str;
pub use persist::{
    BoardDocument, InMemorySnapshotStore, JsonFileStore, PersistError, PersistResult,
    SnapshotStore, SqliteSnapshotStore, TaskRecord, CURRENT_SCHEMA_VERSION,
};
pub use service::task_store::{BoardError, BoardListener, BoardResult, BoardView, TaskStore};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
