//! Async domain traits over the storage layer.
//!
//! Services depend on these rather than on the synchronous methods, keeping
//! the blocking SQLite calls off the async runtime's worker threads.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use haven_core::{
    AnalysisDoc, EmotionalProfile, Goal, GoalStatus, Message, MoodLog, Profile,
    RecommendationFeedback, Role, Session,
};

use crate::job_queue::{Job, JobKind, QueueStats};

/// Session lifecycle and per-session bookkeeping.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Save or replace a session.
    async fn save_session(&self, session: &Session) -> Result<()>;

    /// Get session by id.
    async fn get_session(&self, id: &str) -> Result<Option<Session>>;

    /// All sessions of a user, oldest first.
    async fn get_user_sessions(&self, user_id: &str) -> Result<Vec<Session>>;

    /// Sessions of a user that already carry an emotional analysis.
    async fn get_analyzed_sessions(&self, user_id: &str) -> Result<Vec<Session>>;

    /// Ids of every active session.
    async fn get_active_session_ids(&self) -> Result<Vec<String>>;

    /// Bump activity timestamp and message count; returns the new count.
    async fn record_session_activity(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>>;

    /// Conditional active→ended transition. `true` iff this call ended it.
    async fn end_session(&self, session_id: &str, now: DateTime<Utc>) -> Result<bool>;

    /// Overwrite summary and emotional analysis.
    async fn update_session_analysis(
        &self,
        session_id: &str,
        summary: &str,
        analysis: &AnalysisDoc,
        now: DateTime<Utc>,
    ) -> Result<()>;

    /// Overwrite the summary text.
    async fn update_session_summary(
        &self,
        session_id: &str,
        summary: &str,
        now: DateTime<Utc>,
    ) -> Result<()>;

    /// Record the message count at which pattern analysis was dispatched.
    async fn record_pattern_trigger(&self, session_id: &str, count: i64) -> Result<()>;
}

/// Append-only message log.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a message, assigning the next per-session sequence number.
    async fn append_message(
        &self,
        id: &str,
        session_id: &str,
        role: Role,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Message>;

    /// Ordered history of a session.
    async fn get_session_messages(&self, session_id: &str) -> Result<Vec<Message>>;

    /// Count messages in a session.
    async fn get_message_count(&self, session_id: &str) -> Result<usize>;
}

/// Profile aggregate with optimistic-concurrency writes.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Create the profile if missing, return the current row.
    async fn ensure_profile(&self, user_id: &str, now: DateTime<Utc>) -> Result<Profile>;

    /// Get profile by user id.
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>>;

    /// Conditional write of the emotional profile; `false` on version
    /// conflict.
    async fn try_update_emotional_profile(
        &self,
        user_id: &str,
        expected_version: i64,
        profile: &EmotionalProfile,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// Conditional write of the feedback document; `false` on version
    /// conflict.
    async fn try_update_feedback(
        &self,
        user_id: &str,
        expected_version: i64,
        feedback: &RecommendationFeedback,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// Record a check-in; `false` if the profile is absent.
    async fn record_check_in(&self, user_id: &str, now: DateTime<Utc>) -> Result<bool>;
}

/// Durable job queue.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Enqueue a job; returns the row id.
    async fn enqueue_job(
        &self,
        kind: JobKind,
        subject_id: &str,
        payload: Option<&str>,
    ) -> Result<i64>;

    /// Claim up to `limit` jobs, reclaiming stale in-flight ones.
    async fn claim_jobs(&self, limit: usize, visibility_timeout_secs: i64) -> Result<Vec<Job>>;

    /// Delete a job after successful processing.
    async fn complete_job(&self, id: i64) -> Result<()>;

    /// Fail a job: reschedule within the retry budget, or park it.
    async fn fail_job(&self, id: i64, retry: bool) -> Result<()>;

    /// Release stale processing jobs back to pending.
    async fn release_stale_jobs(&self, visibility_timeout_secs: i64) -> Result<usize>;

    /// Pending jobs, oldest first.
    async fn get_pending_jobs(&self, limit: usize) -> Result<Vec<Job>>;

    /// Failed jobs, newest first.
    async fn get_failed_jobs(&self, limit: usize) -> Result<Vec<Job>>;

    /// Queue statistics.
    async fn get_queue_stats(&self) -> Result<QueueStats>;
}

/// Goals and mood logs.
#[async_trait]
pub trait WellnessStore: Send + Sync {
    async fn save_goal(&self, goal: &Goal) -> Result<()>;

    async fn get_user_goals(&self, user_id: &str) -> Result<Vec<Goal>>;

    async fn update_goal_status(
        &self,
        goal_id: &str,
        user_id: &str,
        status: GoalStatus,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    async fn save_mood_log(&self, log: &MoodLog) -> Result<()>;

    async fn get_user_mood_logs(&self, user_id: &str, limit: usize) -> Result<Vec<MoodLog>>;
}
