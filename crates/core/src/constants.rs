//! Shared constants for haven.
//!
//! Centralizes policy defaults so the scheduler interval and the per-session
//! thresholds stay independently configurable.

/// Hours of inactivity after which a sweep ends an active session.
pub const DEFAULT_INACTIVITY_HOURS: i64 = 24;

/// Message count at which a session triggers user-level pattern analysis.
pub const DEFAULT_PATTERN_MESSAGE_THRESHOLD: i64 = 10;

/// Seconds between runs of the active-session sweep.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;

/// Seconds between polls of the job queue.
pub const DEFAULT_QUEUE_POLL_SECS: u64 = 5;

/// Concurrent job workers.
pub const DEFAULT_QUEUE_WORKERS: usize = 4;

/// Seconds a claimed job may run before it is considered stale and
/// reclaimable by another worker.
pub const DEFAULT_VISIBILITY_TIMEOUT_SECS: i64 = 300;

/// Transient failures tolerated before a job is parked as failed.
pub const DEFAULT_JOB_MAX_RETRIES: i32 = 3;

/// Upper bound on transcript characters fed to an analysis prompt.
pub const MAX_TRANSCRIPT_CHARS: usize = 48_000;
