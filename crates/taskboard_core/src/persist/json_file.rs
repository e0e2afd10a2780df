//! JSON file snapshot store.
//!
//! Writes go to a temp file in the same directory and are renamed over the
//! target, so readers never observe a half-written document. A file that
//! cannot be read is renamed to `<name>.unreadable-<timestamp>` before the
//! board starts over.

use crate::persist::{BoardDocument, PersistResult, SnapshotStore};
use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Default file name inside the app's document directory.
pub const DEFAULT_FILE_NAME: &str = "all-tasks.json";

/// Stores the board as one JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/all-tasks.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "json"
    }

    fn load(&self) -> PersistResult<Option<BoardDocument>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&self, document: &BoardDocument) -> PersistResult<()> {
        let bytes = serde_json::to_vec_pretty(document)?;
        atomic_write(&self.path, &bytes)?;
        Ok(())
    }

    fn set_aside_unreadable(&self) -> PersistResult<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".unreadable-{}", Utc::now().format("%Y%m%dT%H%M%S%3fZ")));
        let target = self.path.with_file_name(name);
        fs::rename(&self.path, &target)?;
        Ok(Some(target))
    }
}

fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::JsonFileStore;
    use crate::persist::SnapshotStore;

    #[test]
    fn load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/deeper/board.json"));

        store.save(&Default::default()).unwrap();

        assert!(store.path().exists());
        assert!(store.load().unwrap().is_some());
    }

    #[test]
    fn set_aside_moves_file_next_to_original() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        assert_eq!(store.set_aside_unreadable().unwrap(), None);

        std::fs::write(store.path(), "{ not json").unwrap();
        let moved = store.set_aside_unreadable().unwrap().unwrap();

        assert!(!store.path().exists());
        assert_eq!(moved.parent(), Some(dir.path()));
        assert!(moved
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("all-tasks.json.unreadable-"));
        assert_eq!(std::fs::read_to_string(moved).unwrap(), "{ not json");
    }
}
