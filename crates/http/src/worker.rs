//! Background job worker: polls the durable queue and runs claimed jobs on
//! bounded concurrency. Fire-and-forget per job; a failed job either goes
//! back to pending (transient) or is parked as failed (not-found, parse).

use std::sync::Arc;
use std::sync::atomic::Ordering;

use haven_core::{DEFAULT_QUEUE_POLL_SECS, DEFAULT_QUEUE_WORKERS, env_parse_with_default};
use haven_service::ServiceError;
use haven_storage::{Job, JobKind, default_visibility_timeout_secs};

use crate::AppState;

/// Concurrent job workers, from `HAVEN_QUEUE_WORKERS`.
#[must_use]
pub fn max_queue_workers() -> usize {
    env_parse_with_default("HAVEN_QUEUE_WORKERS", DEFAULT_QUEUE_WORKERS)
}

/// Execute one claimed job against the services. Results are persisted by
/// the services themselves; the worker only observes success or failure.
pub async fn run_job(state: &AppState, job: &Job) -> Result<(), ServiceError> {
    match job.kind {
        JobKind::GenerateReply => {
            let user_text = job.payload.as_deref().unwrap_or_default();
            state.chat_service.generate_reply(&job.subject_id, user_text).await.map(|_| ())
        },
        JobKind::AnalyzeSession => {
            state.analysis_service.analyze_session(&job.subject_id).await.map(|_| ())
        },
        JobKind::GenerateSummary => {
            state.analysis_service.generate_summary(&job.subject_id).await.map(|_| ())
        },
        JobKind::EndSession => {
            state.lifecycle_service.end_session(&job.subject_id).await.map(|_| ())
        },
        JobKind::CheckSessionStatus => {
            state.lifecycle_service.check_session_status(&job.subject_id).await.map(|_| ())
        },
        JobKind::AnalyzePatterns => {
            state.analysis_service.analyze_patterns(&job.subject_id).await.map(|_| ())
        },
    }
}

async fn settle_job(state: &AppState, job: &Job, outcome: Result<(), ServiceError>) {
    let settled = match outcome {
        Ok(()) => state.queue_service.complete_job(job.id).await,
        Err(e) if e.is_parse() => {
            // Generation answered with an unparseable document. The target
            // records were left untouched; park the job without retry.
            tracing::warn!(
                job_id = job.id,
                kind = job.kind.as_str(),
                subject = %job.subject_id,
                error = %e,
                "job output failed schema validation, parking as failed"
            );
            state.queue_service.fail_job(job.id, false).await
        },
        Err(e) if e.is_transient() => {
            tracing::warn!(
                job_id = job.id,
                kind = job.kind.as_str(),
                subject = %job.subject_id,
                retry = job.retry_count,
                error = %e,
                "transient job failure, rescheduling"
            );
            state.queue_service.fail_job(job.id, true).await
        },
        Err(e) => {
            tracing::error!(
                job_id = job.id,
                kind = job.kind.as_str(),
                subject = %job.subject_id,
                error = %e,
                "job failed permanently"
            );
            state.queue_service.fail_job(job.id, false).await
        },
    };
    if let Err(e) = settled {
        tracing::error!(job_id = job.id, error = %e, "failed to settle job outcome");
    }
}

/// Spawns the background task that polls the queue on a fixed interval and
/// fans claimed jobs out to the semaphore-bounded worker pool.
pub fn start_background_processor(state: Arc<AppState>) {
    tokio::spawn(async move {
        let poll_secs = env_parse_with_default("HAVEN_QUEUE_POLL_SECS", DEFAULT_QUEUE_POLL_SECS);
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(poll_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if !state.processing_active.load(Ordering::SeqCst) {
                continue;
            }

            let available = state.semaphore.available_permits().min(max_queue_workers());
            if available == 0 {
                continue;
            }

            let jobs = match state
                .queue_service
                .claim_jobs(available, default_visibility_timeout_secs())
                .await
            {
                Ok(jobs) => jobs,
                Err(e) => {
                    tracing::error!(error = %e, "worker loop: claim failed");
                    continue;
                },
            };

            if jobs.is_empty() {
                continue;
            }

            let count = jobs.len();
            for job in jobs {
                let permit = match Arc::clone(&state.semaphore).acquire_owned().await {
                    Ok(p) => p,
                    Err(_) => continue,
                };
                let state = Arc::clone(&state);
                // Fire and forget - joining here would head-of-line block the
                // poll loop behind the slowest job.
                tokio::spawn(async move {
                    let _permit = permit;
                    let outcome = run_job(&state, &job).await;
                    settle_job(&state, &job, outcome).await;
                });
            }
            tracing::debug!(count, "worker loop: spawned job tasks");
        }
    });
}

/// Releases stale in-flight jobs back to pending. Run once at startup so
/// work claimed by a crashed process becomes visible again immediately.
///
/// # Errors
/// Returns an error if the queue update fails.
pub async fn run_startup_recovery(state: &AppState) -> anyhow::Result<usize> {
    let released =
        state.queue_service.release_stale_jobs(default_visibility_timeout_secs()).await?;
    if released > 0 {
        tracing::info!(released, "startup recovery: released stale jobs back to pending");
    }
    Ok(released)
}
