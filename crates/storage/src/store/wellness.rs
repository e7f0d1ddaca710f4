use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use haven_core::{Goal, GoalStatus, Mood, MoodLog};
use rusqlite::params;

use super::{Storage, get_conn, log_row_error, parse_dt};

fn row_to_goal(row: &rusqlite::Row<'_>) -> rusqlite::Result<Goal> {
    let status: String = row.get(4)?;
    let target: Option<String> = row.get(5)?;
    Ok(Goal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: status
            .parse::<GoalStatus>()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
        target_date: target
            .map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d"))
            .transpose()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
        created_at: parse_dt(&row.get::<_, String>(6)?)?,
        updated_at: parse_dt(&row.get::<_, String>(7)?)?,
    })
}

fn row_to_mood_log(row: &rusqlite::Row<'_>) -> rusqlite::Result<MoodLog> {
    let mood: String = row.get(2)?;
    Ok(MoodLog {
        id: row.get(0)?,
        user_id: row.get(1)?,
        mood: mood
            .parse::<Mood>()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
        note: row.get(3)?,
        created_at: parse_dt(&row.get::<_, String>(4)?)?,
    })
}

impl Storage {
    pub fn save_goal(&self, goal: &Goal) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT OR REPLACE INTO goals
             (id, user_id, title, description, status, target_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                goal.id,
                goal.user_id,
                goal.title,
                goal.description,
                goal.status.as_str(),
                goal.target_date.map(|d| d.to_string()),
                goal.created_at.to_rfc3339(),
                goal.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_user_goals(&self, user_id: &str) -> Result<Vec<Goal>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, description, status, target_date, created_at, updated_at
             FROM goals WHERE user_id = ?1 ORDER BY created_at",
        )?;
        let goals =
            stmt.query_map(params![user_id], row_to_goal)?.filter_map(log_row_error).collect();
        Ok(goals)
    }

    /// Update a goal's status. Scoped to the owning user; returns `false`
    /// when no matching goal exists.
    pub fn update_goal_status(
        &self,
        goal_id: &str,
        user_id: &str,
        status: GoalStatus,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE goals SET status = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
            params![status.as_str(), now.to_rfc3339(), goal_id, user_id],
        )?;
        Ok(affected == 1)
    }

    pub fn save_mood_log(&self, log: &MoodLog) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO mood_logs (id, user_id, mood, note, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![log.id, log.user_id, log.mood.as_str(), log.note, log.created_at.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Mood logs newest first.
    pub fn get_user_mood_logs(&self, user_id: &str, limit: usize) -> Result<Vec<MoodLog>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, mood, note, created_at
             FROM mood_logs WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2",
        )?;
        let logs = stmt
            .query_map(params![user_id, limit], row_to_mood_log)?
            .filter_map(log_row_error)
            .collect();
        Ok(logs)
    }
}
