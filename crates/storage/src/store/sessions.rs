use anyhow::Result;
use chrono::{DateTime, Utc};
use haven_core::{AnalysisDoc, Session};
use rusqlite::params;

use super::{Storage, get_conn, log_row_error, parse_dt, parse_json, parse_opt_dt};

const SESSION_COLUMNS: &str = "id, user_id, title, summary, emotional_analysis, is_active, \
                               message_count, last_activity, ended_at, pattern_trigger_count, \
                               created_at, updated_at";

fn row_to_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    let analysis: Option<String> = row.get(4)?;
    let emotional_analysis: Option<AnalysisDoc> =
        analysis.as_deref().map(parse_json).transpose()?;
    Ok(Session {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        summary: row.get(3)?,
        emotional_analysis,
        is_active: row.get(5)?,
        message_count: row.get(6)?,
        last_activity: parse_dt(&row.get::<_, String>(7)?)?,
        ended_at: parse_opt_dt(row.get(8)?)?,
        pattern_trigger_count: row.get(9)?,
        created_at: parse_dt(&row.get::<_, String>(10)?)?,
        updated_at: parse_dt(&row.get::<_, String>(11)?)?,
    })
}

impl Storage {
    /// Save or replace a session row.
    pub fn save_session(&self, session: &Session) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        let analysis = session
            .emotional_analysis
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        conn.execute(
            r#"INSERT OR REPLACE INTO sessions
               (id, user_id, title, summary, emotional_analysis, is_active, message_count,
                last_activity, ended_at, pattern_trigger_count, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"#,
            params![
                session.id,
                session.user_id,
                session.title,
                session.summary,
                analysis,
                session.is_active,
                session.message_count,
                session.last_activity.to_rfc3339(),
                session.ended_at.map(|d| d.to_rfc3339()),
                session.pattern_trigger_count,
                session.created_at.to_rfc3339(),
                session.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt =
            conn.prepare(&format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"))?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_session(row)?)),
            None => Ok(None),
        }
    }

    pub fn get_user_sessions(&self, user_id: &str) -> Result<Vec<Session>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = ?1 ORDER BY created_at"
        ))?;
        let sessions =
            stmt.query_map(params![user_id], row_to_session)?.filter_map(log_row_error).collect();
        Ok(sessions)
    }

    /// Sessions of a user that already carry an emotional analysis, oldest
    /// first. Input set for long-term pattern analysis.
    pub fn get_analyzed_sessions(&self, user_id: &str) -> Result<Vec<Session>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE user_id = ?1 AND emotional_analysis IS NOT NULL
             ORDER BY created_at"
        ))?;
        let sessions =
            stmt.query_map(params![user_id], row_to_session)?.filter_map(log_row_error).collect();
        Ok(sessions)
    }

    /// Ids of every active session, for the sweep.
    pub fn get_active_session_ids(&self) -> Result<Vec<String>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare("SELECT id FROM sessions WHERE is_active = 1")?;
        let ids = stmt.query_map([], |row| row.get(0))?.filter_map(log_row_error).collect();
        Ok(ids)
    }

    /// Bump `last_activity` and `message_count` for an inbound or outbound
    /// message. Returns the new message count, or `None` if the session does
    /// not exist.
    pub fn record_session_activity(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "UPDATE sessions
             SET last_activity = ?1, message_count = message_count + 1, updated_at = ?1
             WHERE id = ?2
             RETURNING message_count",
        )?;
        let mut rows = stmt.query(params![now.to_rfc3339(), session_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Transition a session to ended. The update is conditional on the
    /// session not having ended yet, which makes the operation idempotent
    /// and keeps `ended_at`/`is_active` consistent under concurrent enders.
    /// Returns `true` only for the call that performed the transition.
    pub fn end_session(&self, session_id: &str, now: DateTime<Utc>) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE sessions
             SET is_active = 0, ended_at = ?1, updated_at = ?1
             WHERE id = ?2 AND ended_at IS NULL",
            params![now.to_rfc3339(), session_id],
        )?;
        Ok(affected == 1)
    }

    /// Overwrite the session's summary text and emotional analysis after a
    /// successful session analysis.
    pub fn update_session_analysis(
        &self,
        session_id: &str,
        summary: &str,
        analysis: &AnalysisDoc,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "UPDATE sessions SET summary = ?1, emotional_analysis = ?2, updated_at = ?3 WHERE id = ?4",
            params![summary, serde_json::to_string(analysis)?, now.to_rfc3339(), session_id],
        )?;
        Ok(())
    }

    /// Overwrite the session's summary text (full replace).
    pub fn update_session_summary(
        &self,
        session_id: &str,
        summary: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "UPDATE sessions SET summary = ?1, updated_at = ?2 WHERE id = ?3",
            params![summary, now.to_rfc3339(), session_id],
        )?;
        Ok(())
    }

    /// Record that a pattern-analysis job was dispatched at `count` messages.
    /// Monotonic: an older trigger never lowers the recorded count.
    pub fn record_pattern_trigger(&self, session_id: &str, count: i64) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "UPDATE sessions SET pattern_trigger_count = ?1
             WHERE id = ?2 AND pattern_trigger_count < ?1",
            params![count, session_id],
        )?;
        Ok(())
    }
}
