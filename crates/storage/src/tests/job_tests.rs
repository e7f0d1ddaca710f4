use crate::job_queue::{JobKind, JobStatus};

use super::test_storage;

#[test]
fn enqueue_and_claim_oldest_first() {
    let (_dir, storage) = test_storage();
    storage.enqueue_job(JobKind::AnalyzeSession, "s1", None).unwrap();
    storage.enqueue_job(JobKind::GenerateReply, "s1", Some("hello")).unwrap();

    let claimed = storage.claim_jobs(10, 300).unwrap();
    assert_eq!(claimed.len(), 2);
    assert_eq!(claimed[0].kind, JobKind::AnalyzeSession);
    assert_eq!(claimed[1].kind, JobKind::GenerateReply);
    assert_eq!(claimed[1].payload.as_deref(), Some("hello"));
    assert!(claimed.iter().all(|j| j.status == JobStatus::Processing));

    // Claimed jobs are invisible to a second worker.
    assert!(storage.claim_jobs(10, 300).unwrap().is_empty());
}

#[test]
fn complete_removes_the_row() {
    let (_dir, storage) = test_storage();
    let id = storage.enqueue_job(JobKind::EndSession, "s1", None).unwrap();
    let claimed = storage.claim_jobs(1, 300).unwrap();
    assert_eq!(claimed[0].id, id);

    storage.complete_job(id).unwrap();
    let stats = storage.get_queue_stats().unwrap();
    assert_eq!((stats.pending, stats.processing, stats.failed), (0, 0, 0));
}

#[test]
fn transient_failure_reschedules_until_budget_spent() {
    let (_dir, storage) = test_storage();
    let id = storage.enqueue_job(JobKind::AnalyzePatterns, "u1", None).unwrap();

    // Default budget is 3 retries: two failures keep it pending.
    for _ in 0..2 {
        let claimed = storage.claim_jobs(1, 300).unwrap();
        assert_eq!(claimed.len(), 1);
        storage.fail_job(id, true).unwrap();
    }
    let pending = storage.get_pending_jobs(10).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].retry_count, 2);

    // Third failure exhausts the budget.
    storage.claim_jobs(1, 300).unwrap();
    storage.fail_job(id, true).unwrap();
    assert!(storage.get_pending_jobs(10).unwrap().is_empty());
    let failed = storage.get_failed_jobs(10).unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].status, JobStatus::Failed);
}

#[test]
fn permanent_failure_skips_retry() {
    let (_dir, storage) = test_storage();
    let id = storage.enqueue_job(JobKind::AnalyzeSession, "s1", None).unwrap();
    storage.claim_jobs(1, 300).unwrap();
    storage.fail_job(id, false).unwrap();

    assert!(storage.get_pending_jobs(10).unwrap().is_empty());
    assert_eq!(storage.get_failed_jobs(10).unwrap().len(), 1);
}

#[test]
fn stale_processing_jobs_are_reclaimable() {
    let (_dir, storage) = test_storage();
    storage.enqueue_job(JobKind::CheckSessionStatus, "s1", None).unwrap();
    assert_eq!(storage.claim_jobs(1, 300).unwrap().len(), 1);

    // With a negative visibility window the claim is immediately stale.
    let reclaimed = storage.claim_jobs(1, -1).unwrap();
    assert_eq!(reclaimed.len(), 1);

    // release_stale_jobs pushes them back to pending instead of claiming.
    let released = storage.release_stale_jobs(0).unwrap();
    assert_eq!(released, 1);
    assert_eq!(storage.get_pending_jobs(10).unwrap().len(), 1);
}

#[test]
fn stats_track_queue_states() {
    let (_dir, storage) = test_storage();
    storage.enqueue_job(JobKind::GenerateSummary, "s1", None).unwrap();
    storage.enqueue_job(JobKind::GenerateSummary, "s2", None).unwrap();
    let failed_id = storage.enqueue_job(JobKind::GenerateSummary, "s3", None).unwrap();

    let claimed = storage.claim_jobs(1, 300).unwrap();
    assert_eq!(claimed.len(), 1);
    storage.fail_job(failed_id, false).unwrap();

    let stats = storage.get_queue_stats().unwrap();
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.processing, 1);
    assert_eq!(stats.failed, 1);
}
