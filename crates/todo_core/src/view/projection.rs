//! Pure derivation of display lists and counters from the task collection.
//!
//! # Responsibility
//! - Select tasks matching a filter and order them newest-modified first.
//! - Count total/completed/pending tasks.
//!
//! # Invariants
//! - Never mutates its input.
//! - Ordering is stable: tasks with equal stamps keep storage order.
//! - `completed + pending == total`.

use crate::model::task::Task;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Named predicate selecting which tasks are displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl TaskFilter {
    pub const ALL: [TaskFilter; 3] = [Self::All, Self::Pending, Self::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }

    /// Notice shown when nothing matches this filter.
    pub fn empty_state(self) -> EmptyState {
        match self {
            Self::All => EmptyState {
                title: "No tasks yet",
                hint: "Add a task above to get started!",
            },
            Self::Pending => EmptyState {
                title: "No pending tasks",
                hint: "Great job! You've completed all tasks.",
            },
            Self::Completed => EmptyState {
                title: "No completed tasks",
                hint: "Complete some tasks to see them here.",
            },
        }
    }
}

impl Display for TaskFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unknown filter names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFilter(pub String);

impl Display for UnknownFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown filter `{}`; expected all|pending|completed",
            self.0
        )
    }
}

impl Error for UnknownFilter {}

impl FromStr for TaskFilter {
    type Err = UnknownFilter;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownFilter(other.to_string())),
        }
    }
}

/// Empty-list notice for one filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyState {
    pub title: &'static str,
    pub hint: &'static str,
}

/// Render model for one filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub filter: TaskFilter,
    /// Matching tasks sorted by `effective_modified_ms` descending.
    pub items: Vec<Task>,
    pub is_empty: bool,
}

impl Projection {
    /// Returns the notice to show instead of the list, if it is empty.
    pub fn empty_state(&self) -> Option<EmptyState> {
        self.is_empty.then(|| self.filter.empty_state())
    }
}

/// Aggregate counters over the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

/// Projects `tasks` through `filter` into a display-ordered list.
pub fn project(tasks: &[Task], filter: TaskFilter) -> Projection {
    let mut items = tasks
        .iter()
        .filter(|task| filter.matches(task))
        .cloned()
        .collect::<Vec<_>>();
    // `sort_by_key` is stable, which keeps storage order on ties.
    items.sort_by_key(|task| std::cmp::Reverse(task.effective_modified_ms()));

    Projection {
        filter,
        is_empty: items.is_empty(),
        items,
    }
}

/// Counts tasks by completion state.
pub fn stats(tasks: &[Task]) -> TaskStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();
    TaskStats {
        total,
        completed,
        pending: total - completed,
    }
}

#[cfg(test)]
mod tests {
    use super::{project, stats, TaskFilter, TaskStats};
    use crate::model::task::Task;

    fn task(id: i64, completed: bool, last_modified: Option<i64>) -> Task {
        Task {
            id,
            text: format!("task {id}"),
            completed,
            created_at: "2024-05-01T09:30:00.000Z".to_string(),
            last_modified,
        }
    }

    fn ids(tasks: &[Task]) -> Vec<i64> {
        tasks.iter().map(|task| task.id).collect()
    }

    #[test]
    fn filter_names_parse_case_insensitively() {
        assert_eq!("Pending".parse::<TaskFilter>().unwrap(), TaskFilter::Pending);
        assert_eq!(" all ".parse::<TaskFilter>().unwrap(), TaskFilter::All);
        let err = "done".parse::<TaskFilter>().unwrap_err();
        assert!(err.to_string().contains("done"));
        for filter in TaskFilter::ALL {
            assert_eq!(filter.as_str().parse::<TaskFilter>().unwrap(), filter);
        }
    }

    #[test]
    fn sorts_newest_first_and_keeps_storage_order_on_ties() {
        let tasks = vec![
            task(1, false, Some(100)),
            task(2, false, Some(300)),
            task(3, false, Some(100)),
            task(4, false, Some(200)),
        ];
        let projection = project(&tasks, TaskFilter::All);
        assert_eq!(ids(&projection.items), vec![2, 4, 1, 3]);
        assert!(!projection.is_empty);
        assert_eq!(projection.empty_state(), None);
    }

    #[test]
    fn unnormalized_tasks_sort_by_created_at() {
        let created_ms = 1_714_555_800_000;
        let tasks = vec![
            task(1, false, Some(created_ms - 1)),
            task(2, false, None),
            task(3, false, Some(created_ms + 1)),
        ];
        let projection = project(&tasks, TaskFilter::All);
        assert_eq!(ids(&projection.items), vec![3, 2, 1]);
    }

    #[test]
    fn filters_select_by_completion_and_report_empty_state() {
        let tasks = vec![task(1, true, Some(1)), task(2, false, Some(2))];
        assert_eq!(ids(&project(&tasks, TaskFilter::Pending).items), vec![2]);
        assert_eq!(ids(&project(&tasks, TaskFilter::Completed).items), vec![1]);

        let only_pending = vec![task(5, false, Some(1))];
        let completed = project(&only_pending, TaskFilter::Completed);
        assert!(completed.is_empty);
        assert_eq!(
            completed.empty_state().unwrap().title,
            "No completed tasks"
        );
        assert_eq!(
            project(&[], TaskFilter::All).empty_state().unwrap().hint,
            "Add a task above to get started!"
        );
    }

    #[test]
    fn stats_are_consistent() {
        let tasks = vec![
            task(1, true, Some(1)),
            task(2, false, Some(2)),
            task(3, true, Some(3)),
        ];
        assert_eq!(
            stats(&tasks),
            TaskStats {
                total: 3,
                completed: 2,
                pending: 1
            }
        );
        assert_eq!(stats(&[]), TaskStats::default());
    }
}
