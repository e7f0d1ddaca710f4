//! Storage layer for haven
//!
//! SQLite behind an r2d2 connection pool. All store methods are synchronous;
//! the async-facing traits in [`traits`] delegate through `spawn_blocking`.
//! The `jobs` table doubles as the durable work queue for the background
//! pipeline: jobs are claimed with a visibility timeout and either deleted on
//! success, rescheduled on transient failure, or parked as failed.

mod job_queue;
mod migrations;
mod sqlite_async;
mod store;
pub mod traits;

#[cfg(test)]
mod tests;

pub use job_queue::{
    Job, JobKind, JobStatus, QueueStats, default_visibility_timeout_secs, max_retry_count,
};
pub use store::Storage;
