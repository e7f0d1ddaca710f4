use anyhow::Result;
use chrono::Utc;
use rusqlite::params;

use super::{Storage, get_conn, log_row_error};
use crate::job_queue::{Job, JobKind, JobStatus, QueueStats, max_retry_count};

fn row_to_job(row: &rusqlite::Row<'_>) -> rusqlite::Result<Job> {
    let kind: String = row.get(1)?;
    let status: String = row.get(4)?;
    Ok(Job {
        id: row.get(0)?,
        kind: kind
            .parse::<JobKind>()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(e.into()))?,
        subject_id: row.get(2)?,
        payload: row.get(3)?,
        status: status.parse::<JobStatus>().unwrap_or(JobStatus::Pending),
        retry_count: row.get(5)?,
        created_at_epoch: row.get(6)?,
        claimed_at_epoch: row.get(7)?,
    })
}

const JOB_COLUMNS: &str =
    "id, kind, subject_id, payload, status, retry_count, created_at_epoch, claimed_at_epoch";

impl Storage {
    /// Enqueue a job. Returns the new row id.
    pub fn enqueue_job(
        &self,
        kind: JobKind,
        subject_id: &str,
        payload: Option<&str>,
    ) -> Result<i64> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO jobs (kind, subject_id, payload, status, retry_count, created_at_epoch)
             VALUES (?1, ?2, ?3, 'pending', 0, ?4)",
            params![kind.as_str(), subject_id, payload, Utc::now().timestamp()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Claim up to `limit` jobs for processing, oldest first. Jobs stuck in
    /// `processing` past the visibility timeout are reclaimed along with
    /// fresh pending ones.
    pub fn claim_jobs(&self, limit: usize, visibility_timeout_secs: i64) -> Result<Vec<Job>> {
        let conn = get_conn(&self.pool)?;
        let now = Utc::now().timestamp();
        let stale_threshold = now - visibility_timeout_secs;

        let mut stmt = conn.prepare(&format!(
            "UPDATE jobs
               SET status = 'processing', claimed_at_epoch = ?1
               WHERE id IN (
                   SELECT id FROM jobs
                   WHERE status = 'pending'
                      OR (status = 'processing' AND claimed_at_epoch < ?2)
                   ORDER BY created_at_epoch ASC, id ASC
                   LIMIT ?3
               )
               RETURNING {JOB_COLUMNS}"
        ))?;

        let jobs = stmt
            .query_map(params![now, stale_threshold, limit], row_to_job)?
            .filter_map(log_row_error)
            .collect();
        Ok(jobs)
    }

    /// Delete a job after successful processing.
    pub fn complete_job(&self, id: i64) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.execute("DELETE FROM jobs WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Mark a job as failed. With `retry` the job goes back to pending until
    /// the retry budget is spent; without, it is parked as failed directly
    /// (non-retryable outcomes).
    pub fn fail_job(&self, id: i64, retry: bool) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        if retry {
            conn.execute(
                "UPDATE jobs
                   SET retry_count = retry_count + 1,
                       status = CASE
                           WHEN retry_count + 1 >= ?1 THEN 'failed'
                           ELSE 'pending'
                       END,
                       claimed_at_epoch = NULL
                   WHERE id = ?2",
                params![max_retry_count(), id],
            )?;
        } else {
            conn.execute("UPDATE jobs SET status = 'failed' WHERE id = ?1", params![id])?;
        }
        Ok(())
    }

    /// Release stale processing jobs back to pending. Run at startup so jobs
    /// claimed by a crashed worker become visible again immediately.
    pub fn release_stale_jobs(&self, visibility_timeout_secs: i64) -> Result<usize> {
        let conn = get_conn(&self.pool)?;
        let stale_threshold = Utc::now().timestamp() - visibility_timeout_secs;
        let affected = conn.execute(
            "UPDATE jobs SET status = 'pending', claimed_at_epoch = NULL
             WHERE status = 'processing' AND claimed_at_epoch <= ?1",
            params![stale_threshold],
        )?;
        Ok(affected)
    }

    pub fn get_pending_jobs(&self, limit: usize) -> Result<Vec<Job>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE status = 'pending'
             ORDER BY created_at_epoch ASC, id ASC LIMIT ?1"
        ))?;
        let jobs = stmt.query_map(params![limit], row_to_job)?.filter_map(log_row_error).collect();
        Ok(jobs)
    }

    pub fn get_failed_jobs(&self, limit: usize) -> Result<Vec<Job>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE status = 'failed'
             ORDER BY created_at_epoch DESC LIMIT ?1"
        ))?;
        let jobs = stmt.query_map(params![limit], row_to_job)?.filter_map(log_row_error).collect();
        Ok(jobs)
    }

    pub fn get_queue_stats(&self) -> Result<QueueStats> {
        let conn = get_conn(&self.pool)?;
        let (pending, processing, failed): (Option<i64>, Option<i64>, Option<i64>) = conn
            .query_row(
                "SELECT
                    SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END),
                    SUM(CASE WHEN status = 'processing' THEN 1 ELSE 0 END),
                    SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END)
                 FROM jobs",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;
        Ok(QueueStats {
            pending: pending.unwrap_or(0) as u64,
            processing: processing.unwrap_or(0) as u64,
            failed: failed.unwrap_or(0) as u64,
        })
    }
}
