use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AnalysisDoc;

/// A bounded conversation between a user and the assistant.
///
/// Lifecycle invariant: `ended_at` is `Some` exactly when `is_active` is
/// false. The store enforces the transition (active → ended) as a single
/// conditional update so the invariant survives concurrent enders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// Running summary text. Overwritten by session analysis and by the
    /// end-of-session summary document (serialized).
    pub summary: String,
    pub emotional_analysis: Option<AnalysisDoc>,
    pub is_active: bool,
    pub message_count: i64,
    pub last_activity: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Highest `message_count` at which a pattern-analysis job has been
    /// dispatched for this session. Guards the message-count trigger against
    /// re-firing on every sweep pass.
    pub pattern_trigger_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Fresh active session with zero messages.
    #[must_use]
    pub fn new(id: String, user_id: String, title: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            title,
            summary: String::new(),
            emotional_analysis: None,
            is_active: true,
            message_count: 0,
            last_activity: now,
            ended_at: None,
            pattern_trigger_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the lifecycle invariant holds for this record.
    #[must_use]
    pub const fn lifecycle_consistent(&self) -> bool {
        self.is_active == self.ended_at.is_none()
    }
}
