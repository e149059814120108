//! Task store: sole owner of the task collection.
//!
//! # Responsibility
//! - Apply create/toggle/edit/delete/normalize/clear on the collection.
//! - Persist the full collection after every mutation, before returning.
//! - Expose view projections over the current state.
//!
//! # Invariants
//! - Ids are unique: a new id is `max(now_ms, largest_id + 1)`, or the
//!   smallest unused positive id once `largest_id` is `i64::MAX`.
//! - `last_modified` stamps strictly increase across mutations of one store
//!   (they saturate at `i64::MAX`).
//! - A blob that loaded lossily is not rewritten until the first real mutation.
//! - A mutation that returns `Err` leaves the in-memory collection untouched.
//! - Task text never reaches the logs.

use crate::clock::Clock;
use crate::model::task::{normalize_task_text, Task, TaskId, TaskValidationError};
use crate::repo::kv_store::KvStore;
use crate::repo::task_repo::TaskPersistence;
use crate::repo::RepoError;
use crate::view::projection::{self, Projection, TaskFilter, TaskStats};
use log::{debug, info};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Task store error.
#[derive(Debug)]
pub enum StoreError {
    /// Input rejected; nothing was mutated or persisted.
    Validation(TaskValidationError),
    /// Persistence failed; the in-memory state was not changed.
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of `TaskStore::edit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Text replaced and persisted; carries the updated task.
    Updated(Task),
    /// New text was blank; nothing changed.
    Discarded,
    /// No task with that id; nothing changed.
    NotFound,
}

/// Owned task collection backed by a persistence adapter.
pub struct TaskStore<S: KvStore, C: Clock> {
    persistence: TaskPersistence<S>,
    clock: C,
    tasks: Vec<Task>,
    last_id: TaskId,
    last_stamp: i64,
}

impl<S: KvStore, C: Clock> TaskStore<S, C> {
    /// Loads the collection under the default key and normalizes it.
    pub fn open(kv: S, clock: C) -> StoreResult<Self> {
        Self::open_with(TaskPersistence::new(kv), clock)
    }

    /// Loads the collection under `key` and normalizes it.
    pub fn open_with_key(kv: S, clock: C, key: &str) -> StoreResult<Self> {
        Self::open_with(TaskPersistence::with_key(kv, key), clock)
    }

    fn open_with(persistence: TaskPersistence<S>, clock: C) -> StoreResult<Self> {
        let loaded = persistence.load_detailed()?;
        let lossy = loaded.is_lossy();
        let tasks = loaded.tasks;
        let last_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);
        let last_stamp = tasks
            .iter()
            .filter_map(|task| task.last_modified)
            .max()
            .unwrap_or(0);

        let mut store = Self {
            persistence,
            clock,
            tasks,
            last_id,
            last_stamp,
        };
        if lossy {
            store.backfill_in_memory();
        } else {
            store.normalize()?;
        }
        info!(
            "event=store_open module=store status=ok key={} task_count={} lossy_load={lossy}",
            store.persistence.key(),
            store.tasks.len()
        );
        Ok(store)
    }

    /// Backfills `last_modified` on legacy tasks and persists.
    ///
    /// The backfill uses the parsed `created_at`, or now when unparsable.
    /// Re-running on a normalized collection changes nothing but still writes.
    pub fn normalize(&mut self) -> StoreResult<usize> {
        let mut next = self.tasks.clone();
        let backfilled = backfill(&mut next, self.clock.now_ms());

        self.commit(next)?;
        self.track_max_stamp();
        if backfilled > 0 {
            info!("event=store_normalize module=store status=ok backfilled={backfilled}");
        }
        Ok(backfilled)
    }

    /// Appends a new pending task.
    ///
    /// # Errors
    /// - `Validation(EmptyText)` when `text` is blank; nothing is persisted.
    /// - `Repo` when the write fails.
    pub fn create(&mut self, text: &str) -> StoreResult<Task> {
        let text = normalize_task_text(text)?;
        let now = self.clock.now();
        let id = self.next_id(now.timestamp_millis());
        let stamp = self.next_stamp();
        let task = Task::new(id, text, now, stamp);

        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.commit(next)?;
        self.last_id = self.last_id.max(id);
        self.last_stamp = stamp;

        info!("event=task_create module=store status=ok task_id={id}");
        Ok(task)
    }

    /// Flips completion of `id`.
    ///
    /// Returns the updated task, or `None` for an unknown id. The collection
    /// is persisted either way.
    pub fn toggle_completion(&mut self, id: TaskId) -> StoreResult<Option<Task>> {
        let stamp = self.next_stamp();
        let mut next = self.tasks.clone();
        let updated = next.iter_mut().find(|task| task.id == id).map(|task| {
            task.completed = !task.completed;
            task.last_modified = Some(stamp);
            task.clone()
        });

        self.commit(next)?;
        match &updated {
            Some(task) => {
                self.last_stamp = stamp;
                info!(
                    "event=task_toggle module=store status=ok task_id={id} completed={}",
                    task.completed
                );
            }
            None => debug!("event=task_toggle module=store status=not_found task_id={id}"),
        }
        Ok(updated)
    }

    /// Replaces the text of `id` with trimmed `text`.
    ///
    /// Blank text and unknown ids leave the collection and storage untouched.
    pub fn edit(&mut self, id: TaskId, text: &str) -> StoreResult<EditOutcome> {
        let Some(index) = self.position(id) else {
            debug!("event=task_edit module=store status=not_found task_id={id}");
            return Ok(EditOutcome::NotFound);
        };
        let Ok(text) = normalize_task_text(text) else {
            debug!("event=task_edit module=store status=discarded task_id={id}");
            return Ok(EditOutcome::Discarded);
        };

        let stamp = self.next_stamp();
        let mut next = self.tasks.clone();
        let task = &mut next[index];
        task.text = text;
        task.last_modified = Some(stamp);
        let updated = task.clone();

        self.commit(next)?;
        self.last_stamp = stamp;
        info!("event=task_edit module=store status=ok task_id={id}");
        Ok(EditOutcome::Updated(updated))
    }

    /// Removes `id` and persists.
    ///
    /// Returns the removed task, or `None` for an unknown id. The collection
    /// is persisted either way.
    pub fn delete(&mut self, id: TaskId) -> StoreResult<Option<Task>> {
        let mut next = self.tasks.clone();
        let removed = self.position(id).map(|index| next.remove(index));

        self.commit(next)?;
        if removed.is_some() {
            info!("event=task_delete module=store status=ok task_id={id}");
        } else {
            debug!("event=task_delete module=store status=not_found task_id={id}");
        }
        Ok(removed)
    }

    /// Empties the collection and removes the stored blob.
    pub fn clear_all(&mut self) -> StoreResult<()> {
        let removed = self.persistence.clear()?;
        let cleared = self.tasks.len();
        self.tasks.clear();
        info!(
            "event=store_clear module=store status=ok cleared={cleared} blob_removed={removed}"
        );
        Ok(())
    }

    /// Tasks in storage (insertion) order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Display list for `filter` over the current state.
    pub fn project(&self, filter: TaskFilter) -> Projection {
        projection::project(&self.tasks, filter)
    }

    pub fn stats(&self) -> TaskStats {
        projection::stats(&self.tasks)
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn next_id(&self, now_ms: i64) -> TaskId {
        match self.last_id.checked_add(1) {
            Some(after_last) => after_last.max(now_ms),
            None => {
                let used = self.tasks.iter().map(|task| task.id).collect::<HashSet<_>>();
                (1..TaskId::MAX)
                    .find(|candidate| !used.contains(candidate))
                    .unwrap_or(0)
            }
        }
    }

    fn next_stamp(&self) -> i64 {
        self.clock.now_ms().max(self.last_stamp.saturating_add(1))
    }

    /// Backfills stamps without writing, so a lossily loaded blob survives.
    fn backfill_in_memory(&mut self) {
        let backfilled = backfill(&mut self.tasks, self.clock.now_ms());
        self.track_max_stamp();
        if backfilled > 0 {
            info!("event=store_normalize module=store status=deferred backfilled={backfilled}");
        }
    }

    fn track_max_stamp(&mut self) {
        if let Some(max_stamp) = self.tasks.iter().filter_map(|task| task.last_modified).max() {
            self.last_stamp = self.last_stamp.max(max_stamp);
        }
    }

    /// Persists `next`, then installs it as the current state.
    fn commit(&mut self, next: Vec<Task>) -> StoreResult<()> {
        self.persistence.save(&next)?;
        self.tasks = next;
        Ok(())
    }
}

/// Sets missing stamps from `created_at`, or `now_ms` when unparsable.
fn backfill(tasks: &mut [Task], now_ms: i64) -> usize {
    let mut backfilled = 0;
    for task in tasks.iter_mut().filter(|task| task.needs_backfill()) {
        task.last_modified = Some(task.created_at_ms().unwrap_or(now_ms));
        backfilled += 1;
    }
    backfilled
}

#[cfg(test)]
mod tests {
    use super::{EditOutcome, StoreError, TaskStore};
    use crate::clock::ManualClock;
    use crate::model::task::TaskValidationError;
    use crate::repo::kv_store::{KvStore, MemoryKvStore};
    use crate::repo::{RepoError, RepoResult};
    use std::cell::Cell;

    const START_MS: i64 = 1_714_555_800_000;

    /// Memory store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyKv {
        inner: MemoryKvStore,
        fail_writes: Cell<bool>,
    }

    impl KvStore for FlakyKv {
        fn get(&self, key: &str) -> RepoResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> RepoResult<()> {
            if self.fail_writes.get() {
                return Err(RepoError::NotReady("writes disabled"));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> RepoResult<bool> {
            if self.fail_writes.get() {
                return Err(RepoError::NotReady("writes disabled"));
            }
            self.inner.remove(key)
        }
    }

    #[test]
    fn ids_stay_unique_when_clock_does_not_move() {
        let kv = MemoryKvStore::new();
        let clock = ManualClock::new(START_MS);
        let mut store = TaskStore::open(&kv, &clock).unwrap();

        let first = store.create("one").unwrap();
        let second = store.create("two").unwrap();
        let third = store.create("three").unwrap();
        assert_eq!(first.id, START_MS);
        assert_eq!(second.id, START_MS + 1);
        assert_eq!(third.id, START_MS + 2);
        assert!(first.last_modified < second.last_modified);
    }

    #[test]
    fn ids_follow_clock_when_it_moves_ahead() {
        let kv = MemoryKvStore::new();
        let clock = ManualClock::new(START_MS);
        let mut store = TaskStore::open(&kv, &clock).unwrap();

        store.create("one").unwrap();
        clock.advance(10_000);
        let later = store.create("two").unwrap();
        assert_eq!(later.id, START_MS + 10_000);
        assert_eq!(later.last_modified, Some(START_MS + 10_000));
    }

    #[test]
    fn edit_reports_not_found_and_discarded() {
        let kv = MemoryKvStore::new();
        let clock = ManualClock::new(START_MS);
        let mut store = TaskStore::open(&kv, &clock).unwrap();
        let task = store.create("keep").unwrap();

        assert_eq!(store.edit(task.id + 99, "x").unwrap(), EditOutcome::NotFound);
        assert_eq!(store.edit(task.id, "   ").unwrap(), EditOutcome::Discarded);
        assert_eq!(store.get(task.id).unwrap().text, "keep");
    }

    #[test]
    fn failed_write_leaves_state_untouched() {
        let kv = FlakyKv::default();
        let clock = ManualClock::new(START_MS);
        let mut store = TaskStore::open(&kv, &clock).unwrap();
        let task = store.create("stable").unwrap();

        kv.fail_writes.set(true);
        clock.advance(5);
        assert!(matches!(
            store.create("lost").unwrap_err(),
            StoreError::Repo(RepoError::NotReady(_))
        ));
        assert!(store.toggle_completion(task.id).is_err());
        assert!(store.edit(task.id, "renamed").is_err());
        assert!(store.delete(task.id).is_err());
        assert!(store.clear_all().is_err());

        assert_eq!(store.tasks(), &[task.clone()][..]);

        kv.fail_writes.set(false);
        let next = store.create("after recovery").unwrap();
        assert_eq!(next.id, START_MS + 5);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn blank_create_is_a_validation_error() {
        let kv = MemoryKvStore::new();
        let clock = ManualClock::new(START_MS);
        let mut store = TaskStore::open(&kv, &clock).unwrap();

        let err = store.create(" \n ").unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(TaskValidationError::EmptyText)
        ));
        assert!(store.is_empty());
    }
}
