use std::sync::Arc;

use chrono::{Duration, Utc};
use haven_core::{
    DEFAULT_INACTIVITY_HOURS, DEFAULT_PATTERN_MESSAGE_THRESHOLD, env_parse_with_default,
};
use haven_storage::traits::{JobStore, SessionStore};
use haven_storage::{JobKind, Storage};

use crate::ServiceError;

/// The time/count policies driving lifecycle decisions. Kept separate from
/// the sweep interval so both are independently configurable.
#[derive(Debug, Clone, Copy)]
pub struct LifecyclePolicy {
    /// Inactivity span after which an active session is ended.
    pub inactivity: Duration,
    /// Message count at which user-level pattern analysis is triggered.
    pub message_threshold: i64,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            inactivity: Duration::hours(DEFAULT_INACTIVITY_HOURS),
            message_threshold: DEFAULT_PATTERN_MESSAGE_THRESHOLD,
        }
    }
}

impl LifecyclePolicy {
    /// Policy from `HAVEN_INACTIVITY_HOURS` / `HAVEN_PATTERN_MESSAGE_THRESHOLD`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            inactivity: Duration::hours(env_parse_with_default(
                "HAVEN_INACTIVITY_HOURS",
                DEFAULT_INACTIVITY_HOURS,
            )),
            message_threshold: env_parse_with_default(
                "HAVEN_PATTERN_MESSAGE_THRESHOLD",
                DEFAULT_PATTERN_MESSAGE_THRESHOLD,
            ),
        }
    }
}

/// Session state machine (active → ended) and the policies deciding when to
/// schedule analysis work.
pub struct LifecycleService {
    storage: Arc<Storage>,
    policy: LifecyclePolicy,
}

impl LifecycleService {
    #[must_use]
    pub const fn new(storage: Arc<Storage>, policy: LifecyclePolicy) -> Self {
        Self { storage, policy }
    }

    /// End a session now. Idempotent: only the call that performs the
    /// transition schedules the follow-up summary and pattern jobs and
    /// returns `true`.
    pub async fn end_session(&self, session_id: &str) -> Result<bool, ServiceError> {
        let session = SessionStore::get_session(&*self.storage, session_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("session {session_id}")))?;

        let ended = SessionStore::end_session(&*self.storage, session_id, Utc::now()).await?;
        if ended {
            JobStore::enqueue_job(&*self.storage, JobKind::GenerateSummary, session_id, None).await?;
            JobStore::enqueue_job(&*self.storage, JobKind::AnalyzePatterns, &session.user_id, None).await?;
            tracing::info!(session_id, "session ended, summary and pattern jobs scheduled");
        }
        Ok(ended)
    }

    /// Evaluate the time and count triggers for one session. Returns `true`
    /// iff an end or an analysis job was scheduled.
    ///
    /// The message-count trigger fires once per count level: a sweep that
    /// observes the same count again is a no-op until new messages arrive.
    pub async fn check_session_status(&self, session_id: &str) -> Result<bool, ServiceError> {
        let session = SessionStore::get_session(&*self.storage, session_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("session {session_id}")))?;

        let mut scheduled = false;

        if session.is_active && Utc::now() - session.last_activity > self.policy.inactivity {
            JobStore::enqueue_job(&*self.storage, JobKind::EndSession, session_id, None).await?;
            tracing::info!(session_id, "session marked for ending due to inactivity");
            scheduled = true;
        }

        if session.message_count >= self.policy.message_threshold
            && session.message_count > session.pattern_trigger_count
        {
            JobStore::enqueue_job(&*self.storage, JobKind::AnalyzePatterns, &session.user_id, None).await?;
            SessionStore::record_pattern_trigger(&*self.storage, session_id, session.message_count).await?;
            tracing::info!(
                session_id,
                count = session.message_count,
                "pattern analysis triggered by message count"
            );
            scheduled = true;
        }

        Ok(scheduled)
    }

    /// Enumerate all active sessions and dispatch one status check each.
    /// Returns the number of checks dispatched.
    pub async fn sweep_active_sessions(&self) -> Result<usize, ServiceError> {
        let ids = SessionStore::get_active_session_ids(&*self.storage).await?;
        let count = ids.len();
        for id in &ids {
            JobStore::enqueue_job(&*self.storage, JobKind::CheckSessionStatus, id, None).await?;
        }
        if count > 0 {
            tracing::debug!(count, "sweep dispatched session status checks");
        }
        Ok(count)
    }
}
