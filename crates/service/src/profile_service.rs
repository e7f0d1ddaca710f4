use std::sync::Arc;

use chrono::Utc;
use haven_core::{Feedback, Profile};
use haven_storage::Storage;
use haven_storage::traits::ProfileStore;

use crate::ServiceError;

/// Attempts before a feedback upsert gives up on the version race.
const FEEDBACK_MAX_ATTEMPTS: u32 = 5;

/// Profile reads, recommendation feedback, and check-ins.
///
/// Feedback is stored only on the calling user's own profile, so records are
/// user-scoped by construction; there is no cross-user recommendation
/// lookup.
pub struct ProfileService {
    storage: Arc<Storage>,
}

impl ProfileService {
    #[must_use]
    pub const fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// The user's profile, created empty on first touch.
    pub async fn get_or_create_profile(&self, user_id: &str) -> Result<Profile, ServiceError> {
        Ok(ProfileStore::ensure_profile(&*self.storage, user_id, Utc::now()).await?)
    }

    /// Record feedback for a recommendation id: appends on first sight,
    /// updates feedback+timestamp in place on repeat. Returns `true` when an
    /// existing record was updated. Uses the profile's version token so a
    /// racing analysis merge cannot be clobbered.
    pub async fn record_feedback(
        &self,
        user_id: &str,
        recommendation_id: &str,
        feedback: Feedback,
    ) -> Result<bool, ServiceError> {
        let now = Utc::now();
        for attempt in 0..FEEDBACK_MAX_ATTEMPTS {
            let current = ProfileStore::ensure_profile(&*self.storage, user_id, now).await?;
            let mut doc = current.recommendation_feedback;
            let updated = doc.record(recommendation_id, feedback, now);
            if ProfileStore::try_update_feedback(&*self.storage, user_id, current.version, &doc, now).await? {
                tracing::info!(user_id, recommendation_id, feedback = feedback.as_str(), "feedback recorded");
                return Ok(updated);
            }
            tracing::debug!(user_id, attempt, "feedback version conflict, retrying");
        }
        Err(ServiceError::MergeContention {
            user_id: user_id.to_owned(),
            attempts: FEEDBACK_MAX_ATTEMPTS,
        })
    }

    /// Record a wellbeing check-in on the user's profile.
    pub async fn check_in(&self, user_id: &str) -> Result<(), ServiceError> {
        let now = Utc::now();
        ProfileStore::ensure_profile(&*self.storage, user_id, now).await?;
        ProfileStore::record_check_in(&*self.storage, user_id, now).await?;
        Ok(())
    }
}
