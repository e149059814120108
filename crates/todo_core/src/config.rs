//! Store configuration.
//!
//! All values are explicit; nothing is read from the environment.

use crate::logging::default_log_level;
use crate::repo::task_repo::DEFAULT_STORAGE_KEY;
use std::path::PathBuf;

const DEFAULT_DB_FILE_NAME: &str = "todo.sqlite3";

/// Where and how a task store session keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite file holding the task collection blob.
    pub db_path: PathBuf,
    /// Key of the task collection blob.
    pub storage_key: String,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute log directory. File logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }

    pub fn with_storage_key(mut self, storage_key: impl Into<String>) -> Self {
        self.storage_key = storage_key.into();
        self
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(log_dir.into());
        self
    }

    /// Rejects configurations the store cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.storage_key.trim().is_empty() {
            return Err("storage_key cannot be empty".to_string());
        }
        if self.db_path.as_os_str().is_empty() {
            return Err("db_path cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::StoreConfig;
    use std::path::PathBuf;

    #[test]
    fn defaults_use_todos_key() {
        let config = StoreConfig::default();
        assert_eq!(config.storage_key, "todos");
        assert_eq!(config.db_path, PathBuf::from("todo.sqlite3"));
        assert!(config.log_dir.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn blank_storage_key_is_rejected() {
        let config = StoreConfig::default().with_storage_key("  ");
        assert!(config.validate().unwrap_err().contains("storage_key"));
    }
}
