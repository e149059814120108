//! Repository layer: storage primitive and task persistence adapter.
//!
//! # Responsibility
//! - Define the key-value contract the task collection is stored through.
//! - Serialize the whole collection as one blob under one key.
//!
//! # Invariants
//! - There are no partial updates; every save rewrites the full blob.
//! - Storage engine failures surface as `RepoError`; undecodable blobs do not.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod kv_store;
pub mod task_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for storage and serialization failures.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialize(serde_json::Error),
    /// The backing storage has not been prepared (e.g. migrations missing).
    NotReady(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize task collection: {err}"),
            Self::NotReady(details) => write!(f, "storage not ready: {details}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::NotReady(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}
