//! Per-user emotional profile aggregate and its merge operations.
//!
//! The profile is shared mutable state between independently scheduled jobs.
//! Merges are pure: current value in, new value out, appending exactly one
//! history entry and overwriting only the latest-snapshot fields. The store
//! layer pairs these with a version-token conditional write so racing merges
//! retry instead of clobbering each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AnalysisDoc, DomainError, EmotionalThemes, PatternDoc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub themes: EmotionalThemes,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub analysis: PatternDoc,
}

/// The accumulating emotional-profile document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionalProfile {
    #[serde(default)]
    pub last_session_analysis: Option<AnalysisDoc>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub emotional_history: Vec<EmotionalHistoryEntry>,
    #[serde(default)]
    pub long_term_analysis: Option<PatternDoc>,
    #[serde(default)]
    pub last_pattern_analysis: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pattern_history: Vec<PatternHistoryEntry>,
}

impl EmotionalProfile {
    /// Fold one session analysis in: appends a single history entry and
    /// replaces the latest-analysis snapshot. Prior history is untouched.
    #[must_use]
    pub fn with_session_analysis(
        mut self,
        session_id: &str,
        analysis: AnalysisDoc,
        now: DateTime<Utc>,
    ) -> Self {
        self.emotional_history.push(EmotionalHistoryEntry {
            timestamp: now,
            themes: analysis.emotional_themes.clone(),
            session_id: session_id.to_owned(),
        });
        self.last_session_analysis = Some(analysis);
        self.last_updated = Some(now);
        self
    }

    /// Fold one pattern analysis in: appends a single pattern-history entry
    /// and replaces the long-term snapshot.
    #[must_use]
    pub fn with_pattern_analysis(mut self, analysis: PatternDoc, now: DateTime<Utc>) -> Self {
        self.pattern_history.push(PatternHistoryEntry { timestamp: now, analysis: analysis.clone() });
        self.long_term_analysis = Some(analysis);
        self.last_pattern_analysis = Some(now);
        self
    }
}

/// User verdict on a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Positive,
    Negative,
}

impl Feedback {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl std::str::FromStr for Feedback {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            other => Err(DomainError::InvalidFeedback(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub id: String,
    pub feedback: Feedback,
    pub timestamp: DateTime<Utc>,
}

/// Feedback records keyed by recommendation id: unique per id, last write
/// wins on feedback and timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationFeedback {
    #[serde(default)]
    pub recommendations: Vec<FeedbackEntry>,
}

impl RecommendationFeedback {
    /// Upsert by recommendation id. Returns `true` when an existing record
    /// was updated, `false` when a new one was appended.
    pub fn record(&mut self, id: &str, feedback: Feedback, now: DateTime<Utc>) -> bool {
        if let Some(entry) = self.recommendations.iter_mut().find(|r| r.id == id) {
            entry.feedback = feedback;
            entry.timestamp = now;
            return true;
        }
        self.recommendations.push(FeedbackEntry {
            id: id.to_owned(),
            feedback,
            timestamp: now,
        });
        false
    }
}

/// Persisted per-user profile row.
///
/// `version` is the optimistic-concurrency token: every successful write
/// increments it, and writers must present the version they read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub emotional_profile: EmotionalProfile,
    pub recommendation_feedback: RecommendationFeedback,
    pub last_check_in: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Empty profile for a new user.
    #[must_use]
    pub fn new(user_id: String, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            emotional_profile: EmotionalProfile::default(),
            recommendation_feedback: RecommendationFeedback::default(),
            last_check_in: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
