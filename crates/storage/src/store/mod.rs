//! SQLite storage implementation
//!
//! Synchronous methods split per domain; the async façade lives in
//! `sqlite_async`. Connections come from an r2d2 pool with WAL and a busy
//! timeout so short write bursts from concurrent jobs queue instead of
//! erroring.

#![allow(
    clippy::as_conversions,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "SQLite i64 <-> Rust usize conversions are bounded by DB row counts"
)]

mod jobs;
mod messages;
mod profiles;
mod sessions;
mod wellness;

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::migrations;

pub(crate) type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Main storage struct wrapping a SQLite connection pool.
#[derive(Clone)]
pub struct Storage {
    pub(crate) pool: Pool<SqliteConnectionManager>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").field("pool_size", &self.pool.state().connections).finish()
    }
}

impl Storage {
    /// Open (or create) the database at `db_path` and run migrations.
    pub fn new(db_path: &Path) -> Result<Self> {
        let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )
        });
        let pool = Pool::builder().build(manager)?;

        let conn = get_conn(&pool)?;
        migrations::run_migrations(&conn)?;
        drop(conn);

        Ok(Self { pool })
    }
}

/// Get a connection from the pool.
pub(crate) fn get_conn(pool: &Pool<SqliteConnectionManager>) -> Result<PooledConn> {
    pool.get().map_err(|e| anyhow::anyhow!("Failed to get connection from pool: {e}"))
}

/// Log row read errors and filter them out.
pub(crate) fn log_row_error<T>(result: rusqlite::Result<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("Row read error: {}", e);
            None
        },
    }
}

/// Parse JSON from a stored string, converting the error to a rusqlite error.
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(s: &str) -> rusqlite::Result<T> {
    serde_json::from_str(s).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Parse an RFC 3339 timestamp from a stored string.
pub(crate) fn parse_dt(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Parse an optional RFC 3339 timestamp.
pub(crate) fn parse_opt_dt(s: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    s.as_deref().map(parse_dt).transpose()
}
