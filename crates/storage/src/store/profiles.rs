use anyhow::Result;
use chrono::{DateTime, Utc};
use haven_core::{EmotionalProfile, Profile, RecommendationFeedback};
use rusqlite::params;

use super::{Storage, get_conn, parse_dt, parse_json, parse_opt_dt};

fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<Profile> {
    let emotional: String = row.get(1)?;
    let feedback: String = row.get(2)?;
    Ok(Profile {
        user_id: row.get(0)?,
        emotional_profile: parse_json::<EmotionalProfile>(&emotional)?,
        recommendation_feedback: parse_json::<RecommendationFeedback>(&feedback)?,
        last_check_in: parse_opt_dt(row.get(3)?)?,
        version: row.get(4)?,
        created_at: parse_dt(&row.get::<_, String>(5)?)?,
        updated_at: parse_dt(&row.get::<_, String>(6)?)?,
    })
}

const PROFILE_COLUMNS: &str = "user_id, emotional_profile, recommendation_feedback, \
                               last_check_in, version, created_at, updated_at";

impl Storage {
    /// Create an empty profile for the user if none exists, then return the
    /// current row.
    pub fn ensure_profile(&self, user_id: &str, now: DateTime<Utc>) -> Result<Profile> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT OR IGNORE INTO profiles (user_id, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![user_id, now.to_rfc3339()],
        )?;
        drop(conn);
        self.get_profile(user_id)?
            .ok_or_else(|| anyhow::anyhow!("profile vanished after insert: {user_id}"))
    }

    pub fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt =
            conn.prepare(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1"))?;
        let mut rows = stmt.query(params![user_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_profile(row)?)),
            None => Ok(None),
        }
    }

    /// Conditional write of the emotional-profile document. Succeeds only if
    /// the caller still holds the current version token; the token is bumped
    /// on success so a racing merge observes the conflict and re-reads.
    pub fn try_update_emotional_profile(
        &self,
        user_id: &str,
        expected_version: i64,
        profile: &EmotionalProfile,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE profiles
             SET emotional_profile = ?1, version = version + 1, updated_at = ?2
             WHERE user_id = ?3 AND version = ?4",
            params![serde_json::to_string(profile)?, now.to_rfc3339(), user_id, expected_version],
        )?;
        Ok(affected == 1)
    }

    /// Conditional write of the recommendation-feedback document, same
    /// version protocol as the emotional profile.
    pub fn try_update_feedback(
        &self,
        user_id: &str,
        expected_version: i64,
        feedback: &RecommendationFeedback,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE profiles
             SET recommendation_feedback = ?1, version = version + 1, updated_at = ?2
             WHERE user_id = ?3 AND version = ?4",
            params![serde_json::to_string(feedback)?, now.to_rfc3339(), user_id, expected_version],
        )?;
        Ok(affected == 1)
    }

    /// Record a wellbeing check-in. Returns `false` if the profile is absent.
    pub fn record_check_in(&self, user_id: &str, now: DateTime<Utc>) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE profiles SET last_check_in = ?1, updated_at = ?1 WHERE user_id = ?2",
            params![now.to_rfc3339(), user_id],
        )?;
        Ok(affected == 1)
    }
}
