//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record persisted in the task collection blob.
//! - Own text normalization and timestamp helpers shared by store and view.
//!
//! # Invariants
//! - `id` is unique within one collection.
//! - `text` is non-empty and trimmed after create/edit.
//! - `created_at` is fixed for the record lifetime.
//! - `last_modified` may only be absent on legacy records that have not
//!   been normalized yet.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identifier of a task inside its collection.
///
/// Persisted as a JSON number.
pub type TaskId = i64;

/// One to-do item.
///
/// Field names on the wire follow the persisted blob layout
/// (`id`, `text`, `completed`, `createdAt`, `lastModified`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    /// Missing on some legacy records; read as pending.
    #[serde(default)]
    pub completed: bool,
    /// ISO-8601 creation time, e.g. `2024-05-01T09:30:00.000Z`.
    pub created_at: String,
    /// Epoch milliseconds of the latest mutation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
}

impl Task {
    /// Creates a pending task stamped at `now`.
    ///
    /// `text` is stored as given; callers normalize it first.
    pub fn new(id: TaskId, text: impl Into<String>, now: DateTime<Utc>, stamp_ms: i64) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            created_at: format_created_at(now),
            last_modified: Some(stamp_ms),
        }
    }

    /// Returns whether `last_modified` has to be backfilled.
    ///
    /// A zero stamp counts as missing.
    pub fn needs_backfill(&self) -> bool {
        self.last_modified.map_or(true, |ms| ms == 0)
    }

    /// Parses `created_at` into epoch milliseconds.
    ///
    /// Returns `None` for unparsable values and for the epoch itself.
    pub fn created_at_ms(&self) -> Option<i64> {
        parse_iso_ms(self.created_at.trim()).filter(|ms| *ms != 0)
    }

    /// Sort key used by the view: `last_modified`, then `created_at`, then 0.
    pub fn effective_modified_ms(&self) -> i64 {
        match self.last_modified {
            Some(ms) if ms != 0 => ms,
            _ => self.created_at_ms().unwrap_or(0),
        }
    }
}

/// Domain validation error for task input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Text is empty after trimming whitespace.
    EmptyText,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text must not be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// Trims task text and rejects whitespace-only input.
pub fn normalize_task_text(raw: &str) -> Result<String, TaskValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyText);
    }
    Ok(trimmed.to_string())
}

/// Formats without an offset are read as UTC.
const NAIVE_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses RFC 3339, offset-less date-times and bare `YYYY-MM-DD` dates.
fn parse_iso_ms(value: &str) -> Option<i64> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.timestamp_millis());
    }
    if let Some(parsed) = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Some(parsed.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_millis())
}

/// Formats a creation time with millisecond precision and a `Z` suffix.
pub fn format_created_at(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
