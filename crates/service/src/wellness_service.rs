use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use haven_core::{Goal, GoalStatus, Mood, MoodLog};
use haven_storage::Storage;
use haven_storage::traits::WellnessStore;

use crate::ServiceError;

/// Goals and mood logs alongside the conversational pipeline.
pub struct WellnessService {
    storage: Arc<Storage>,
}

impl WellnessService {
    #[must_use]
    pub const fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub async fn create_goal(
        &self,
        user_id: &str,
        title: &str,
        description: &str,
        target_date: Option<NaiveDate>,
    ) -> Result<Goal, ServiceError> {
        let now = Utc::now();
        let goal = Goal {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            title: title.to_owned(),
            description: description.to_owned(),
            status: GoalStatus::Pending,
            target_date,
            created_at: now,
            updated_at: now,
        };
        WellnessStore::save_goal(&*self.storage, &goal).await?;
        Ok(goal)
    }

    pub async fn list_goals(&self, user_id: &str) -> Result<Vec<Goal>, ServiceError> {
        Ok(WellnessStore::get_user_goals(&*self.storage, user_id).await?)
    }

    /// Update a goal's status, scoped to the owning user.
    pub async fn set_goal_status(
        &self,
        user_id: &str,
        goal_id: &str,
        status: GoalStatus,
    ) -> Result<(), ServiceError> {
        let updated = self.storage.update_goal_status(goal_id, user_id, status, Utc::now()).await?;
        if !updated {
            return Err(ServiceError::NotFound(format!("goal {goal_id}")));
        }
        Ok(())
    }

    pub async fn log_mood(
        &self,
        user_id: &str,
        mood: Mood,
        note: &str,
    ) -> Result<MoodLog, ServiceError> {
        let log = MoodLog {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            mood,
            note: note.to_owned(),
            created_at: Utc::now(),
        };
        self.storage.save_mood_log(&log).await?;
        Ok(log)
    }

    pub async fn list_moods(&self, user_id: &str, limit: usize) -> Result<Vec<MoodLog>, ServiceError> {
        Ok(self.storage.get_user_mood_logs(user_id, limit).await?)
    }
}
