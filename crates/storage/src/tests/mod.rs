//! Storage tests against a throwaway on-disk database.

mod job_tests;
mod message_tests;
mod profile_tests;
mod wellness_tests;

use crate::Storage;

/// Fresh storage in a temp directory. The directory guard must stay alive
/// for the duration of the test.
pub(crate) fn test_storage() -> (tempfile::TempDir, Storage) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let storage = Storage::new(&dir.path().join("haven-test.db")).expect("open storage");
    (dir, storage)
}
