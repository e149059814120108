//! Task domain model.
//!
//! # Responsibility
//! - Define the task record and the text rules applied on create/edit.
//!
//! # Invariants
//! - Every task is identified by a `TaskId` unique within its collection.
//! - Insertion order of the collection is storage order, not display order.

pub mod task;
