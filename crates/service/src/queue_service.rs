use std::sync::Arc;

use haven_storage::traits::JobStore;
use haven_storage::{Job, JobKind, QueueStats, Storage};

use crate::ServiceError;

/// Thin façade over the durable job queue for dispatchers and the worker
/// loop.
pub struct QueueService {
    storage: Arc<Storage>,
}

impl QueueService {
    #[must_use]
    pub const fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// Dispatch a job with no payload. Returns the job id the caller can
    /// surface in a 202-style response.
    pub async fn dispatch(&self, kind: JobKind, subject_id: &str) -> Result<i64, ServiceError> {
        Ok(JobStore::enqueue_job(&*self.storage, kind, subject_id, None).await?)
    }

    /// Dispatch a reply job carrying the user's text.
    pub async fn dispatch_reply(
        &self,
        session_id: &str,
        user_text: &str,
    ) -> Result<i64, ServiceError> {
        Ok(JobStore::enqueue_job(&*self.storage, JobKind::GenerateReply, session_id, Some(user_text)).await?)
    }

    pub async fn claim_jobs(
        &self,
        limit: usize,
        visibility_timeout_secs: i64,
    ) -> Result<Vec<Job>, ServiceError> {
        Ok(JobStore::claim_jobs(&*self.storage, limit, visibility_timeout_secs).await?)
    }

    pub async fn complete_job(&self, id: i64) -> Result<(), ServiceError> {
        Ok(JobStore::complete_job(&*self.storage, id).await?)
    }

    pub async fn fail_job(&self, id: i64, retry: bool) -> Result<(), ServiceError> {
        Ok(JobStore::fail_job(&*self.storage, id, retry).await?)
    }

    pub async fn release_stale_jobs(
        &self,
        visibility_timeout_secs: i64,
    ) -> Result<usize, ServiceError> {
        Ok(JobStore::release_stale_jobs(&*self.storage, visibility_timeout_secs).await?)
    }

    pub async fn get_queue_stats(&self) -> Result<QueueStats, ServiceError> {
        Ok(JobStore::get_queue_stats(&*self.storage).await?)
    }

    pub async fn get_pending_jobs(&self, limit: usize) -> Result<Vec<Job>, ServiceError> {
        Ok(JobStore::get_pending_jobs(&*self.storage, limit).await?)
    }

    pub async fn get_failed_jobs(&self, limit: usize) -> Result<Vec<Job>, ServiceError> {
        Ok(JobStore::get_failed_jobs(&*self.storage, limit).await?)
    }
}
