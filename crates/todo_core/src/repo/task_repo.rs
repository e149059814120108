//! Task collection persistence adapter.
//!
//! # Responsibility
//! - Load and save the full task collection as one JSON array blob.
//! - Remove the blob entirely on clear.
//!
//! # Invariants
//! - Load is fail-safe: absent, `null` and undecodable blobs read as an
//!   empty collection; undecodable records are skipped one by one.
//! - `clear` removes the key; it never writes an empty array.

use crate::model::task::Task;
use crate::repo::kv_store::KvStore;
use crate::repo::RepoResult;
use log::warn;
use serde_json::Value;

/// Storage key of the task collection blob.
pub const DEFAULT_STORAGE_KEY: &str = "todos";

/// Outcome of a detailed load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadedTasks {
    pub tasks: Vec<Task>,
    /// Records present in the blob but skipped as undecodable.
    pub dropped: usize,
    /// The blob itself was not a JSON array (or `null`).
    pub blob_invalid: bool,
}

impl LoadedTasks {
    /// Whether saving `tasks` back would lose stored data.
    pub fn is_lossy(&self) -> bool {
        self.blob_invalid || self.dropped > 0
    }
}

/// Reads and writes the task collection through a `KvStore`.
pub struct TaskPersistence<S: KvStore> {
    kv: S,
    key: String,
}

impl<S: KvStore> TaskPersistence<S> {
    /// Uses the default `todos` key.
    pub fn new(kv: S) -> Self {
        Self::with_key(kv, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(kv: S, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the stored collection in storage order.
    ///
    /// # Errors
    /// - Only storage engine failures. Decode failures are logged and
    ///   recovered as an empty or partial collection.
    pub fn load(&self) -> RepoResult<Vec<Task>> {
        Ok(self.load_detailed()?.tasks)
    }

    /// Like `load`, but reports what had to be skipped.
    pub fn load_detailed(&self) -> RepoResult<LoadedTasks> {
        let Some(blob) = self.kv.get(&self.key)? else {
            return Ok(LoadedTasks::default());
        };

        let records = match serde_json::from_str::<Option<Vec<Value>>>(&blob) {
            Ok(records) => records.unwrap_or_default(),
            Err(err) => {
                warn!(
                    "event=tasks_load module=repo status=recovered error_code=invalid_blob blob_len={} line={} column={}",
                    blob.len(),
                    err.line(),
                    err.column()
                );
                return Ok(LoadedTasks {
                    blob_invalid: true,
                    ..LoadedTasks::default()
                });
            }
        };

        let mut loaded = LoadedTasks::default();
        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<Task>(record) {
                Ok(task) => loaded.tasks.push(task),
                Err(err) => {
                    warn!(
                        "event=tasks_load module=repo status=recovered error_code=invalid_record index={index} error={err}"
                    );
                    loaded.dropped += 1;
                }
            }
        }
        Ok(loaded)
    }

    /// Replaces the stored blob with `tasks`.
    pub fn save(&self, tasks: &[Task]) -> RepoResult<()> {
        let blob = serde_json::to_string(tasks)?;
        self.kv.set(&self.key, &blob)
    }

    /// Removes the stored blob. Returns whether one existed.
    pub fn clear(&self) -> RepoResult<bool> {
        self.kv.remove(&self.key)
    }

    /// Returns whether a blob is currently stored, decodable or not.
    pub fn is_present(&self) -> RepoResult<bool> {
        Ok(self.kv.get(&self.key)?.is_some())
    }
}
