use anyhow::Result;
use chrono::{DateTime, Utc};
use haven_core::{Message, Role};
use rusqlite::{TransactionBehavior, params};

use super::{Storage, get_conn, log_row_error, parse_dt};

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let role: String = row.get(2)?;
    Ok(Message {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role: role
            .parse::<Role>()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
        content: row.get(3)?,
        seq: row.get(4)?,
        created_at: parse_dt(&row.get::<_, String>(5)?)?,
    })
}

impl Storage {
    /// Append a message to a session, assigning the next sequence number
    /// inside an immediate transaction. Two concurrent appenders serialize
    /// here, so `seq` is gapless and strictly ordered regardless of clock
    /// behavior.
    pub fn append_message(
        &self,
        id: &str,
        session_id: &str,
        role: Role,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Message> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let seq: i64 = tx.query_row(
            "SELECT COALESCE(MAX(seq), 0) + 1 FROM messages WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO messages (id, session_id, role, content, seq, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, session_id, role.as_str(), content, seq, now.to_rfc3339()],
        )?;
        tx.commit()?;
        Ok(Message {
            id: id.to_owned(),
            session_id: session_id.to_owned(),
            role,
            content: content.to_owned(),
            seq,
            created_at: now,
        })
    }

    /// Full ordered history of a session.
    pub fn get_session_messages(&self, session_id: &str) -> Result<Vec<Message>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, session_id, role, content, seq, created_at
             FROM messages WHERE session_id = ?1 ORDER BY seq",
        )?;
        let messages =
            stmt.query_map(params![session_id], row_to_message)?.filter_map(log_row_error).collect();
        Ok(messages)
    }

    pub fn get_message_count(&self, session_id: &str) -> Result<usize> {
        let conn = get_conn(&self.pool)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
