//! Runtime configuration resolution.
//!
//! # Responsibility
//! - Resolve where the board is stored, which backend is used and how
//!   logging is set up.
//!
//! # Invariants
//! - Precedence: explicit value, then environment variable, then default.
//! - Blank environment values are treated as unset.

use crate::logging::default_log_level;
use crate::persist::json_file::DEFAULT_FILE_NAME;
use crate::persist::{JsonFileStore, PersistResult, SnapshotStore, SqliteSnapshotStore};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_DATA_FILE: &str = "TASKBOARD_DATA_FILE";
pub const ENV_BACKEND: &str = "TASKBOARD_BACKEND";
pub const ENV_LOG_LEVEL: &str = "TASKBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKBOARD_LOG_DIR";

const SQLITE_FILE_NAME: &str = "taskboard.sqlite3";
const LOG_DIR_NAME: &str = "taskboard-logs";

/// Snapshot backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sqlite => "sqlite",
        }
    }

    fn default_file_name(self) -> &'static str {
        match self {
            Self::Json => DEFAULT_FILE_NAME,
            Self::Sqlite => SQLITE_FILE_NAME,
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            other => Err(format!(
                "unsupported storage backend `{other}`; expected json|sqlite"
            )),
        }
    }
}

/// Partially specified configuration, e.g. from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_file: Option<PathBuf>,
    pub backend: Option<StorageBackend>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub data_file: PathBuf,
    pub backend: StorageBackend,
    pub log_level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
}

impl BoardConfig {
    /// Resolves from overrides and the process environment.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, String> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolves with an injectable environment lookup.
    pub fn resolve_with(
        overrides: ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let lookup = |key: &str| {
            env(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let backend = match overrides.backend {
            Some(backend) => backend,
            None => lookup(ENV_BACKEND)
                .map(|raw| raw.parse::<StorageBackend>())
                .transpose()?
                .unwrap_or_default(),
        };

        let data_file = overrides
            .data_file
            .or_else(|| lookup(ENV_DATA_FILE).map(PathBuf::from))
            .unwrap_or_else(|| std::env::temp_dir().join(backend.default_file_name()));

        let log_level = overrides
            .log_level
            .or_else(|| lookup(ENV_LOG_LEVEL))
            .unwrap_or_else(|| default_log_level().to_string());

        let log_dir = overrides
            .log_dir
            .or_else(|| lookup(ENV_LOG_DIR).map(PathBuf::from))
            .unwrap_or_else(|| std::env::temp_dir().join(LOG_DIR_NAME));

        Ok(Self {
            data_file,
            backend,
            log_level,
            log_dir,
        })
    }

    /// Opens the configured snapshot backend.
    pub fn open_snapshot_store(&self) -> PersistResult<Box<dyn SnapshotStore + Send>> {
        Ok(match self.backend {
            StorageBackend::Json => Box::new(JsonFileStore::new(self.data_file.clone())),
            StorageBackend::Sqlite => Box::new(SqliteSnapshotStore::open(&self.data_file)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardConfig, ConfigOverrides, StorageBackend, ENV_BACKEND, ENV_DATA_FILE};
    use std::path::PathBuf;

    fn env_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn explicit_values_win_over_environment() {
        let overrides = ConfigOverrides {
            data_file: Some(PathBuf::from("/data/board.json")),
            backend: Some(StorageBackend::Json),
            ..ConfigOverrides::default()
        };
        let config = BoardConfig::resolve_with(
            overrides,
            env_from(&[(ENV_BACKEND, "sqlite"), (ENV_DATA_FILE, "/env/board.db")]),
        )
        .unwrap();

        assert_eq!(config.backend, StorageBackend::Json);
        assert_eq!(config.data_file, PathBuf::from("/data/board.json"));
    }

    #[test]
    fn environment_fills_missing_values_and_blank_is_unset() {
        let config = BoardConfig::resolve_with(
            ConfigOverrides::default(),
            env_from(&[(ENV_BACKEND, " SQLite "), (ENV_DATA_FILE, "   ")]),
        )
        .unwrap();

        assert_eq!(config.backend, StorageBackend::Sqlite);
        assert!(config.data_file.ends_with("taskboard.sqlite3"));
        assert!(config.log_dir.is_absolute());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = BoardConfig::resolve_with(
            ConfigOverrides::default(),
            env_from(&[(ENV_BACKEND, "postgres")]),
        )
        .unwrap_err();
        assert!(err.contains("postgres"));
    }
}
