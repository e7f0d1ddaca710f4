use std::sync::Arc;

use chrono::{DateTime, Utc};
use haven_core::{AnalysisDoc, EmotionalProfile, PatternDoc, SummaryDoc};
use haven_llm::LlmClient;
use haven_storage::Storage;
use haven_storage::traits::{MessageStore, ProfileStore, SessionStore};

use crate::ServiceError;

/// Attempts before an optimistic profile merge gives up.
const MERGE_MAX_ATTEMPTS: u32 = 5;

/// Result of a pattern-analysis run.
#[derive(Debug, Clone)]
pub enum PatternOutcome {
    /// The user has no analyzed sessions yet; generation was not called.
    NoData,
    Analyzed(PatternDoc),
}

/// The structured-analysis operations: per-session analysis, end-of-session
/// summary, and cross-session pattern analysis. All three share one shape:
/// build a JSON-constrained prompt, call generation, parse, persist. A parse
/// failure leaves every record untouched.
pub struct AnalysisService {
    storage: Arc<Storage>,
    llm: Arc<LlmClient>,
}

impl AnalysisService {
    #[must_use]
    pub const fn new(storage: Arc<Storage>, llm: Arc<LlmClient>) -> Self {
        Self { storage, llm }
    }

    /// Analyze one session and fold the result into the owner's profile.
    pub async fn analyze_session(&self, session_id: &str) -> Result<AnalysisDoc, ServiceError> {
        let session = SessionStore::get_session(&*self.storage, session_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("session {session_id}")))?;
        let messages = MessageStore::get_session_messages(&*self.storage, session_id).await?;
        let transcript = messages
            .iter()
            .map(|m| format!("{}: {}", m.role.as_str(), m.content))
            .collect::<Vec<_>>()
            .join("\n");

        let analysis = self.llm.analyze_conversation(&transcript).await?;

        let now = Utc::now();
        SessionStore::update_session_analysis(&*self.storage, session_id, &analysis.summary, &analysis, now).await?;
        self.merge_profile(&session.user_id, now, |profile| {
            profile.with_session_analysis(session_id, analysis.clone(), now)
        })
        .await?;

        tracing::info!(session_id, user_id = %session.user_id, "session analysis merged");
        Ok(analysis)
    }

    /// Produce the end-of-session summary and overwrite the session's
    /// summary field with the serialized document.
    pub async fn generate_summary(&self, session_id: &str) -> Result<SummaryDoc, ServiceError> {
        SessionStore::get_session(&*self.storage, session_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("session {session_id}")))?;
        let messages = MessageStore::get_session_messages(&*self.storage, session_id).await?;
        let transcript = messages
            .iter()
            .map(|m| {
                format!("{} ({}): {}", m.role.as_str(), m.created_at.format("%H:%M"), m.content)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let doc = self.llm.summarize_session(&transcript).await?;
        let serialized = serde_json::to_string_pretty(&doc)?;
        SessionStore::update_session_summary(&*self.storage, session_id, &serialized, Utc::now()).await?;

        tracing::info!(session_id, "session summary stored");
        Ok(doc)
    }

    /// Analyze long-term patterns across every analyzed session of the user.
    /// Skips generation entirely when there is nothing to analyze.
    pub async fn analyze_patterns(&self, user_id: &str) -> Result<PatternOutcome, ServiceError> {
        let sessions = SessionStore::get_analyzed_sessions(&*self.storage, user_id).await?;
        if sessions.is_empty() {
            tracing::info!(user_id, "no analyzed sessions, skipping pattern analysis");
            return Ok(PatternOutcome::NoData);
        }

        let mut doc = self.llm.analyze_patterns(&sessions).await?;
        let assigned = assign_recommendation_ids(&mut doc);
        if assigned > 0 {
            tracing::debug!(user_id, assigned, "assigned ids to recommendations");
        }

        let now = Utc::now();
        self.merge_profile(user_id, now, |profile| {
            profile.with_pattern_analysis(doc.clone(), now)
        })
        .await?;

        tracing::info!(user_id, sessions = sessions.len(), "pattern analysis merged");
        Ok(PatternOutcome::Analyzed(doc))
    }

    /// Optimistic read-merge-write loop over the profile's emotional
    /// document. The profile is created on demand; a lost version race
    /// re-reads and re-applies the pure merge against the fresh state.
    async fn merge_profile<F>(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        merge: F,
    ) -> Result<(), ServiceError>
    where
        F: Fn(EmotionalProfile) -> EmotionalProfile,
    {
        for attempt in 0..MERGE_MAX_ATTEMPTS {
            let current = ProfileStore::ensure_profile(&*self.storage, user_id, now).await?;
            let merged = merge(current.emotional_profile);
            if ProfileStore::try_update_emotional_profile(&*self.storage, user_id, current.version, &merged, now)
                .await?
            {
                return Ok(());
            }
            tracing::debug!(user_id, attempt, "profile merge version conflict, retrying");
        }
        Err(ServiceError::MergeContention {
            user_id: user_id.to_owned(),
            attempts: MERGE_MAX_ATTEMPTS,
        })
    }
}

/// Give every recommendation that arrived without an id a fresh unique one.
/// Runs before persistence, exactly once per document, so an id is never
/// regenerated for the same logical recommendation on re-merge.
fn assign_recommendation_ids(doc: &mut PatternDoc) -> usize {
    let mut assigned = 0;
    for rec in &mut doc.long_term_patterns.recommendations {
        if rec.id.as_deref().is_none_or(str::is_empty) {
            rec.id = Some(uuid::Uuid::new_v4().to_string());
            assigned += 1;
        }
    }
    assigned
}

#[cfg(test)]
mod tests {
    use haven_core::{LongTermPatterns, Recommendation};

    use super::*;

    #[test]
    fn ids_assigned_only_where_missing() {
        let mut doc = PatternDoc {
            long_term_patterns: LongTermPatterns {
                recommendations: vec![
                    Recommendation {
                        id: Some("keep-me".to_owned()),
                        focus_area: "sleep".to_owned(),
                        ..Recommendation::default()
                    },
                    Recommendation { focus_area: "boundaries".to_owned(), ..Recommendation::default() },
                    Recommendation {
                        id: Some(String::new()),
                        focus_area: "exercise".to_owned(),
                        ..Recommendation::default()
                    },
                ],
                ..LongTermPatterns::default()
            },
            therapeutic_insights: None,
        };

        assert_eq!(assign_recommendation_ids(&mut doc), 2);
        let recs = &doc.long_term_patterns.recommendations;
        assert_eq!(recs[0].id.as_deref(), Some("keep-me"));
        assert!(recs[1].id.as_deref().is_some_and(|id| !id.is_empty()));
        assert!(recs[2].id.as_deref().is_some_and(|id| !id.is_empty()));
        assert_ne!(recs[1].id, recs[2].id);

        // Re-running assigns nothing further: ids are stable once set.
        assert_eq!(assign_recommendation_ids(&mut doc), 0);
    }
}
