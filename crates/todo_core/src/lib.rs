//! Core logic of the todo list: task store, view projection and persistence.
//! Presentation layers call into this crate and render what it returns.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, init_logging_for, logging_status};
pub use model::task::{normalize_task_text, Task, TaskId, TaskValidationError};
pub use repo::kv_store::{KvStore, MemoryKvStore, SqliteKvStore};
pub use repo::task_repo::{LoadedTasks, TaskPersistence, DEFAULT_STORAGE_KEY};
pub use repo::{RepoError, RepoResult};
pub use service::task_store::{EditOutcome, StoreError, StoreResult, TaskStore};
pub use view::projection::{
    project, stats, EmptyState, Projection, TaskFilter, TaskStats, UnknownFilter,
};

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
