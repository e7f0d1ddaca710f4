//! Async trait implementations for the SQLite [`Storage`] via
//! `spawn_blocking`. Each method clones the pool handle and owned copies of
//! its borrowed arguments, then runs the synchronous store call on the
//! blocking pool.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use haven_core::{
    AnalysisDoc, EmotionalProfile, Goal, GoalStatus, Message, MoodLog, Profile,
    RecommendationFeedback, Role, Session,
};

use crate::Storage;
use crate::job_queue::{Job, JobKind, QueueStats};
use crate::traits::{JobStore, MessageStore, ProfileStore, SessionStore, WellnessStore};

async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {e}"))?
}

#[async_trait]
impl SessionStore for Storage {
    async fn save_session(&self, session: &Session) -> Result<()> {
        let (s, session) = (self.clone(), session.clone());
        blocking(move || s.save_session(&session)).await
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let (s, id) = (self.clone(), id.to_owned());
        blocking(move || s.get_session(&id)).await
    }

    async fn get_user_sessions(&self, user_id: &str) -> Result<Vec<Session>> {
        let (s, user_id) = (self.clone(), user_id.to_owned());
        blocking(move || s.get_user_sessions(&user_id)).await
    }

    async fn get_analyzed_sessions(&self, user_id: &str) -> Result<Vec<Session>> {
        let (s, user_id) = (self.clone(), user_id.to_owned());
        blocking(move || s.get_analyzed_sessions(&user_id)).await
    }

    async fn get_active_session_ids(&self) -> Result<Vec<String>> {
        let s = self.clone();
        blocking(move || s.get_active_session_ids()).await
    }

    async fn record_session_activity(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>> {
        let (s, session_id) = (self.clone(), session_id.to_owned());
        blocking(move || s.record_session_activity(&session_id, now)).await
    }

    async fn end_session(&self, session_id: &str, now: DateTime<Utc>) -> Result<bool> {
        let (s, session_id) = (self.clone(), session_id.to_owned());
        blocking(move || s.end_session(&session_id, now)).await
    }

    async fn update_session_analysis(
        &self,
        session_id: &str,
        summary: &str,
        analysis: &AnalysisDoc,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let (s, session_id, summary, analysis) =
            (self.clone(), session_id.to_owned(), summary.to_owned(), analysis.clone());
        blocking(move || s.update_session_analysis(&session_id, &summary, &analysis, now)).await
    }

    async fn update_session_summary(
        &self,
        session_id: &str,
        summary: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let (s, session_id, summary) = (self.clone(), session_id.to_owned(), summary.to_owned());
        blocking(move || s.update_session_summary(&session_id, &summary, now)).await
    }

    async fn record_pattern_trigger(&self, session_id: &str, count: i64) -> Result<()> {
        let (s, session_id) = (self.clone(), session_id.to_owned());
        blocking(move || s.record_pattern_trigger(&session_id, count)).await
    }
}

#[async_trait]
impl MessageStore for Storage {
    async fn append_message(
        &self,
        id: &str,
        session_id: &str,
        role: Role,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Message> {
        let (s, id, session_id, content) =
            (self.clone(), id.to_owned(), session_id.to_owned(), content.to_owned());
        blocking(move || s.append_message(&id, &session_id, role, &content, now)).await
    }

    async fn get_session_messages(&self, session_id: &str) -> Result<Vec<Message>> {
        let (s, session_id) = (self.clone(), session_id.to_owned());
        blocking(move || s.get_session_messages(&session_id)).await
    }

    async fn get_message_count(&self, session_id: &str) -> Result<usize> {
        let (s, session_id) = (self.clone(), session_id.to_owned());
        blocking(move || s.get_message_count(&session_id)).await
    }
}

#[async_trait]
impl ProfileStore for Storage {
    async fn ensure_profile(&self, user_id: &str, now: DateTime<Utc>) -> Result<Profile> {
        let (s, user_id) = (self.clone(), user_id.to_owned());
        blocking(move || s.ensure_profile(&user_id, now)).await
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let (s, user_id) = (self.clone(), user_id.to_owned());
        blocking(move || s.get_profile(&user_id)).await
    }

    async fn try_update_emotional_profile(
        &self,
        user_id: &str,
        expected_version: i64,
        profile: &EmotionalProfile,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let (s, user_id, profile) = (self.clone(), user_id.to_owned(), profile.clone());
        blocking(move || s.try_update_emotional_profile(&user_id, expected_version, &profile, now))
            .await
    }

    async fn try_update_feedback(
        &self,
        user_id: &str,
        expected_version: i64,
        feedback: &RecommendationFeedback,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let (s, user_id, feedback) = (self.clone(), user_id.to_owned(), feedback.clone());
        blocking(move || s.try_update_feedback(&user_id, expected_version, &feedback, now)).await
    }

    async fn record_check_in(&self, user_id: &str, now: DateTime<Utc>) -> Result<bool> {
        let (s, user_id) = (self.clone(), user_id.to_owned());
        blocking(move || s.record_check_in(&user_id, now)).await
    }
}

#[async_trait]
impl JobStore for Storage {
    async fn enqueue_job(
        &self,
        kind: JobKind,
        subject_id: &str,
        payload: Option<&str>,
    ) -> Result<i64> {
        let (s, subject_id, payload) =
            (self.clone(), subject_id.to_owned(), payload.map(ToOwned::to_owned));
        blocking(move || s.enqueue_job(kind, &subject_id, payload.as_deref())).await
    }

    async fn claim_jobs(&self, limit: usize, visibility_timeout_secs: i64) -> Result<Vec<Job>> {
        let s = self.clone();
        blocking(move || s.claim_jobs(limit, visibility_timeout_secs)).await
    }

    async fn complete_job(&self, id: i64) -> Result<()> {
        let s = self.clone();
        blocking(move || s.complete_job(id)).await
    }

    async fn fail_job(&self, id: i64, retry: bool) -> Result<()> {
        let s = self.clone();
        blocking(move || s.fail_job(id, retry)).await
    }

    async fn release_stale_jobs(&self, visibility_timeout_secs: i64) -> Result<usize> {
        let s = self.clone();
        blocking(move || s.release_stale_jobs(visibility_timeout_secs)).await
    }

    async fn get_pending_jobs(&self, limit: usize) -> Result<Vec<Job>> {
        let s = self.clone();
        blocking(move || s.get_pending_jobs(limit)).await
    }

    async fn get_failed_jobs(&self, limit: usize) -> Result<Vec<Job>> {
        let s = self.clone();
        blocking(move || s.get_failed_jobs(limit)).await
    }

    async fn get_queue_stats(&self) -> Result<QueueStats> {
        let s = self.clone();
        blocking(move || s.get_queue_stats()).await
    }
}

#[async_trait]
impl WellnessStore for Storage {
    async fn save_goal(&self, goal: &Goal) -> Result<()> {
        let (s, goal) = (self.clone(), goal.clone());
        blocking(move || s.save_goal(&goal)).await
    }

    async fn get_user_goals(&self, user_id: &str) -> Result<Vec<Goal>> {
        let (s, user_id) = (self.clone(), user_id.to_owned());
        blocking(move || s.get_user_goals(&user_id)).await
    }

    async fn update_goal_status(
        &self,
        goal_id: &str,
        user_id: &str,
        status: GoalStatus,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let (s, goal_id, user_id) = (self.clone(), goal_id.to_owned(), user_id.to_owned());
        blocking(move || s.update_goal_status(&goal_id, &user_id, status, now)).await
    }

    async fn save_mood_log(&self, log: &MoodLog) -> Result<()> {
        let (s, log) = (self.clone(), log.clone());
        blocking(move || s.save_mood_log(&log)).await
    }

    async fn get_user_mood_logs(&self, user_id: &str, limit: usize) -> Result<Vec<MoodLog>> {
        let (s, user_id) = (self.clone(), user_id.to_owned());
        blocking(move || s.get_user_mood_logs(&user_id, limit)).await
    }
}
