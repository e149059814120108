//! Core use-case services.
//!
//! # Responsibility
//! - Own the task collection and route every mutation through persistence.
//! - Keep presentation callers decoupled from storage details.

pub mod task_store;
