use chrono::Utc;
use haven_core::{AnalysisDoc, EmotionalProfile, Feedback, RecommendationFeedback};

use super::test_storage;

#[test]
fn ensure_profile_is_idempotent() {
    let (_dir, storage) = test_storage();
    let now = Utc::now();
    let first = storage.ensure_profile("u1", now).unwrap();
    let second = storage.ensure_profile("u1", now).unwrap();
    assert_eq!(first.version, 0);
    assert_eq!(second.version, 0);
    assert!(second.emotional_profile.emotional_history.is_empty());
}

#[test]
fn conditional_write_succeeds_with_current_version() {
    let (_dir, storage) = test_storage();
    let now = Utc::now();
    let profile = storage.ensure_profile("u1", now).unwrap();

    let doc = AnalysisDoc { summary: "s".to_owned(), ..AnalysisDoc::default() };
    let merged = profile.emotional_profile.with_session_analysis("s1", doc, now);
    assert!(storage.try_update_emotional_profile("u1", profile.version, &merged, now).unwrap());

    let reloaded = storage.get_profile("u1").unwrap().unwrap();
    assert_eq!(reloaded.version, profile.version + 1);
    assert_eq!(reloaded.emotional_profile.emotional_history.len(), 1);
}

#[test]
fn conditional_write_rejects_stale_version() {
    let (_dir, storage) = test_storage();
    let now = Utc::now();
    let profile = storage.ensure_profile("u1", now).unwrap();

    // Writer A lands first.
    let a = profile.emotional_profile.clone().with_session_analysis(
        "s1",
        AnalysisDoc::default(),
        now,
    );
    assert!(storage.try_update_emotional_profile("u1", profile.version, &a, now).unwrap());

    // Writer B read the same version and must be told to retry.
    let b = profile.emotional_profile.with_session_analysis("s2", AnalysisDoc::default(), now);
    assert!(!storage.try_update_emotional_profile("u1", profile.version, &b, now).unwrap());

    // Only writer A's entry is present; nothing was clobbered.
    let reloaded = storage.get_profile("u1").unwrap().unwrap();
    assert_eq!(reloaded.emotional_profile.emotional_history.len(), 1);
    assert_eq!(reloaded.emotional_profile.emotional_history[0].session_id, "s1");
}

#[test]
fn feedback_write_shares_the_version_token() {
    let (_dir, storage) = test_storage();
    let now = Utc::now();
    let profile = storage.ensure_profile("u1", now).unwrap();

    let mut fb = RecommendationFeedback::default();
    fb.record("rec-1", Feedback::Positive, now);
    assert!(storage.try_update_feedback("u1", profile.version, &fb, now).unwrap());

    // The emotional-profile write that raced it sees the bumped token.
    let stale = EmotionalProfile::default();
    assert!(!storage.try_update_emotional_profile("u1", profile.version, &stale, now).unwrap());

    let reloaded = storage.get_profile("u1").unwrap().unwrap();
    assert_eq!(reloaded.recommendation_feedback.recommendations.len(), 1);
}

#[test]
fn check_in_requires_existing_profile() {
    let (_dir, storage) = test_storage();
    let now = Utc::now();
    assert!(!storage.record_check_in("u1", now).unwrap());
    storage.ensure_profile("u1", now).unwrap();
    assert!(storage.record_check_in("u1", now).unwrap());
    let profile = storage.get_profile("u1").unwrap().unwrap();
    assert!(profile.last_check_in.is_some());
}
