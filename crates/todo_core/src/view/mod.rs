//! Read-only view models derived from the task collection.
//!
//! # Responsibility
//! - Turn the stored collection into render-ready lists and counters.
//! - Stay free of storage and presentation concerns.

pub mod projection;
