//! In-memory snapshot store for tests and previews.

use crate::persist::{BoardDocument, PersistResult, SnapshotStore};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Keeps the last saved document in memory and counts saves.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    document: Mutex<Option<BoardDocument>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `document`, as if saved by an earlier run.
    pub fn with_document(document: BoardDocument) -> Self {
        Self {
            document: Mutex::new(Some(document)),
            ..Self::default()
        }
    }

    /// Number of successful saves so far.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Copy of the currently stored document.
    pub fn stored(&self) -> Option<BoardDocument> {
        self.document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Makes subsequent saves fail with an I/O error.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn load(&self) -> PersistResult<Option<BoardDocument>> {
        Ok(self.stored())
    }

    fn save(&self, document: &BoardDocument) -> PersistResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("in-memory store rejects writes").into());
        }
        *self.document.lock().unwrap_or_else(PoisonError::into_inner) = Some(document.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
