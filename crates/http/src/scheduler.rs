//! Recurring sweep over active sessions.
//!
//! The scheduler only decides *when* the sweep runs; the per-session policy
//! (inactivity threshold, message-count trigger) lives in the lifecycle
//! service, so interval and thresholds are independently configurable.

use std::sync::Arc;

use haven_core::{DEFAULT_SWEEP_INTERVAL_SECS, env_parse_with_default};

use crate::AppState;

/// Spawns the background task that dispatches `check_session_status` jobs
/// for every active session on a fixed interval
/// (`HAVEN_SWEEP_INTERVAL_SECS`).
pub fn start_sweep_scheduler(state: Arc<AppState>) {
    tokio::spawn(async move {
        let interval_secs =
            env_parse_with_default("HAVEN_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS);
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match state.lifecycle_service.sweep_active_sessions().await {
                Ok(count) if count > 0 => {
                    tracing::info!(count, "sweep dispatched session status checks");
                },
                Ok(_) => {},
                Err(e) => {
                    tracing::warn!(error = %e, "sweep failed");
                },
            }
        }
    });
}
