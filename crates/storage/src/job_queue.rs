//! Job queue types shared across modules.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use haven_core::{
    DEFAULT_JOB_MAX_RETRIES, DEFAULT_VISIBILITY_TIMEOUT_SECS, env_parse_with_default,
};

/// The work units of the pipeline. Each variant names the operation a worker
/// performs when it claims the job; `subject_id` on [`Job`] is a session id
/// except for `AnalyzePatterns`, where it is a user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    GenerateReply,
    AnalyzeSession,
    GenerateSummary,
    EndSession,
    CheckSessionStatus,
    AnalyzePatterns,
}

impl JobKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::GenerateReply => "generate_reply",
            Self::AnalyzeSession => "analyze_session",
            Self::GenerateSummary => "generate_summary",
            Self::EndSession => "end_session",
            Self::CheckSessionStatus => "check_session_status",
            Self::AnalyzePatterns => "analyze_patterns",
        }
    }
}

impl FromStr for JobKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generate_reply" => Ok(Self::GenerateReply),
            "analyze_session" => Ok(Self::AnalyzeSession),
            "generate_summary" => Ok(Self::GenerateSummary),
            "end_session" => Ok(Self::EndSession),
            "check_session_status" => Ok(Self::CheckSessionStatus),
            "analyze_patterns" => Ok(Self::AnalyzePatterns),
            other => Err(anyhow::anyhow!("Invalid job kind: {other}")),
        }
    }
}

/// Queue state of a job row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting to be claimed.
    Pending,
    /// Claimed by a worker; reclaimable after the visibility timeout.
    Processing,
    /// Gave up: retries exhausted or the failure is not retryable.
    Failed,
}

impl JobStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "failed" => Ok(Self::Failed),
            other => Err(anyhow::anyhow!("Invalid job status: {other}")),
        }
    }
}

/// A durable work unit. Successful jobs are deleted, so rows only accumulate
/// while pending, in flight, or failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub kind: JobKind,
    /// Session id, or user id for `AnalyzePatterns`.
    pub subject_id: String,
    /// Extra input for the job; the user's text for `GenerateReply`.
    pub payload: Option<String>,
    pub status: JobStatus,
    pub retry_count: i32,
    pub created_at_epoch: i64,
    pub claimed_at_epoch: Option<i64>,
}

/// Counts per queue state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct QueueStats {
    pub pending: u64,
    pub processing: u64,
    pub failed: u64,
}

/// Seconds a claimed job stays invisible before it can be reclaimed.
#[must_use]
pub fn default_visibility_timeout_secs() -> i64 {
    env_parse_with_default("HAVEN_QUEUE_VISIBILITY_SECS", DEFAULT_VISIBILITY_TIMEOUT_SECS)
}

/// Transient failures tolerated before a job is parked as failed.
#[must_use]
pub fn max_retry_count() -> i32 {
    env_parse_with_default("HAVEN_JOB_MAX_RETRIES", DEFAULT_JOB_MAX_RETRIES)
}
