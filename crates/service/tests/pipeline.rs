//! End-to-end pipeline tests: services against real SQLite storage and a
//! mocked generation endpoint.

use std::sync::Arc;

use chrono::{Duration, Utc};
use haven_core::{Feedback, Role, Session, SummaryDoc};
use haven_llm::LlmClient;
use haven_service::{
    AnalysisService, ChatService, LifecyclePolicy, LifecycleService, PatternOutcome,
    ProfileService,
};
use haven_storage::traits::{JobStore, MessageStore, ProfileStore, SessionStore};
use haven_storage::{JobKind, Storage};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    _dir: tempfile::TempDir,
    storage: Arc<Storage>,
    server: MockServer,
}

impl Harness {
    async fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = Arc::new(Storage::new(&dir.path().join("haven.db")).expect("storage"));
        let server = MockServer::start().await;
        Self { _dir: dir, storage, server }
    }

    fn llm(&self) -> Arc<LlmClient> {
        Arc::new(
            LlmClient::new("test-key".to_owned(), self.server.uri())
                .expect("client")
                .with_model("test-model".to_owned()),
        )
    }

    fn chat(&self) -> ChatService {
        ChatService::new(Arc::clone(&self.storage), self.llm())
    }

    fn analysis(&self) -> AnalysisService {
        AnalysisService::new(Arc::clone(&self.storage), self.llm())
    }

    fn lifecycle(&self) -> LifecycleService {
        LifecycleService::new(Arc::clone(&self.storage), LifecyclePolicy::default())
    }

    fn profiles(&self) -> ProfileService {
        ProfileService::new(Arc::clone(&self.storage))
    }

    async fn seed_session(&self, id: &str, user: &str) {
        let session = Session::new(id.to_owned(), user.to_owned(), format!("session {id}"), Utc::now());
        self.storage.save_session(&session).await.unwrap();
    }

    async fn mount_completion(&self, content: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": content, "role": "assistant"}}]
            })))
            .mount(&self.server)
            .await;
    }

    async fn pending_jobs(&self) -> Vec<(JobKind, String)> {
        self.storage
            .get_pending_jobs(100)
            .await
            .unwrap()
            .into_iter()
            .map(|j| (j.kind, j.subject_id))
            .collect()
    }
}

fn analysis_content() -> String {
    json!({
        "summary": "worked through a stressful week",
        "emotional_themes": {
            "primary_emotions": ["stress", "hope"],
            "intensity_levels": {"anxiety": 5, "stress": 7, "depression": 2, "hope": 6},
            "emotional_progression": "tension eased toward the end"
        },
        "concerns": ["workload"],
        "progress": {
            "insights_gained": ["overcommitment pattern"],
            "coping_strategies": ["saying no"],
            "next_steps": ["weekly review"]
        }
    })
    .to_string()
}

fn pattern_content() -> String {
    json!({
        "long_term_patterns": {
            "recurring_themes": [
                {"theme": "work stress", "frequency": "most sessions", "sessions": ["s1"], "progression": "slowly improving"}
            ],
            "emotional_trends": {
                "overall_progression": "steadier month over month",
                "key_emotions": [
                    {"emotion": "anxiety", "trend": "decreasing", "triggers": ["deadlines"], "coping_effectiveness": "improving"}
                ]
            },
            "progress_indicators": [],
            "recommendations": [
                {"focus_area": "sleep hygiene", "reason": "late nights recur", "suggested_approaches": ["fixed bedtime"]}
            ]
        }
    })
    .to_string()
}

// ── Response generation ──────────────────────────────────────────

#[tokio::test]
async fn reply_appends_exactly_one_assistant_message() {
    let h = Harness::new().await;
    h.seed_session("s1", "u1").await;
    h.storage.ensure_profile("u1", Utc::now()).await.unwrap();
    h.mount_completion("I'm here with you. What felt heaviest today?").await;

    let chat = h.chat();
    let (_msg, count) = chat.record_user_message("s1", "feeling low").await.unwrap();
    assert_eq!(count, 1);

    let reply = chat.generate_reply("s1", "feeling low").await.unwrap();
    assert_eq!(reply, "I'm here with you. What felt heaviest today?");

    let history = h.storage.get_session_messages("s1").await.unwrap();
    assert_eq!(history.len(), 2);
    let last = history.last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(history[..history.len() - 1].iter().all(|m| m.seq < last.seq));

    // The outbound message counts as session activity too.
    let session = h.storage.get_session("s1").await.unwrap().unwrap();
    assert_eq!(session.message_count, 2);
}

#[tokio::test]
async fn reply_requires_existing_session_and_profile() {
    let h = Harness::new().await;
    let chat = h.chat();

    let err = chat.generate_reply("ghost", "hi").await.unwrap_err();
    assert!(err.is_not_found());

    h.seed_session("s1", "u1").await;
    let err = chat.generate_reply("s1", "hi").await.unwrap_err();
    assert!(err.is_not_found());

    // No writes happened along the way.
    assert!(h.storage.get_session_messages("s1").await.unwrap().is_empty());
}

#[tokio::test]
async fn reply_upstream_failure_persists_nothing() {
    let h = Harness::new().await;
    h.seed_session("s1", "u1").await;
    h.storage.ensure_profile("u1", Utc::now()).await.unwrap();
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&h.server)
        .await;

    let chat = h.chat();
    chat.record_user_message("s1", "hello").await.unwrap();
    let err = chat.generate_reply("s1", "hello").await.unwrap_err();
    assert!(!err.is_parse());

    let history = h.storage.get_session_messages("s1").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(h.storage.get_session("s1").await.unwrap().unwrap().message_count, 1);
}

// ── Structured analysis ──────────────────────────────────────────

#[tokio::test]
async fn analyze_session_merges_additively() {
    let h = Harness::new().await;
    h.seed_session("s1", "u1").await;
    h.storage
        .append_message("m1", "s1", Role::User, "rough week at work", Utc::now())
        .await
        .unwrap();
    h.mount_completion(&analysis_content()).await;

    let analysis = h.analysis();
    let doc = analysis.analyze_session("s1").await.unwrap();
    assert_eq!(doc.summary, "worked through a stressful week");

    let session = h.storage.get_session("s1").await.unwrap().unwrap();
    assert_eq!(session.summary, doc.summary);
    assert_eq!(session.emotional_analysis.as_ref().unwrap(), &doc);

    let profile = h.storage.get_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.emotional_profile.emotional_history.len(), 1);
    let first_entry =
        serde_json::to_string(&profile.emotional_profile.emotional_history[0]).unwrap();

    // A second analysis appends; the prior entry is preserved byte-for-byte.
    analysis.analyze_session("s1").await.unwrap();
    let profile = h.storage.get_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.emotional_profile.emotional_history.len(), 2);
    assert_eq!(
        serde_json::to_string(&profile.emotional_profile.emotional_history[0]).unwrap(),
        first_entry
    );
}

#[tokio::test]
async fn analyze_session_parse_failure_leaves_records_untouched() {
    let h = Harness::new().await;
    h.seed_session("s1", "u1").await;
    h.storage.ensure_profile("u1", Utc::now()).await.unwrap();
    h.mount_completion("I'd rather chat in prose, sorry.").await;

    let err = h.analysis().analyze_session("s1").await.unwrap_err();
    assert!(err.is_parse());
    assert!(!err.is_transient());

    let session = h.storage.get_session("s1").await.unwrap().unwrap();
    assert!(session.summary.is_empty());
    assert!(session.emotional_analysis.is_none());

    let profile = h.storage.get_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.version, 0);
    assert!(profile.emotional_profile.emotional_history.is_empty());
}

#[tokio::test]
async fn summary_replaces_session_summary_wholesale() {
    let h = Harness::new().await;
    h.seed_session("s1", "u1").await;
    h.storage.append_message("m1", "s1", Role::User, "hello", Utc::now()).await.unwrap();
    h.storage.update_session_summary("s1", "old running summary", Utc::now()).await.unwrap();
    h.mount_completion(
        &json!({
            "session_summary": {
                "topics_discussed": [{"topic": "sleep", "time": "21:10", "key_points": ["late caffeine"], "techniques_suggested": ["wind-down routine"]}],
                "homework_assigned": ["no coffee after 3pm"],
                "follow_up_topics": ["morning routine"],
                "progress_made": ["pattern identified"]
            }
        })
        .to_string(),
    )
    .await;

    let doc = h.analysis().generate_summary("s1").await.unwrap();
    let session = h.storage.get_session("s1").await.unwrap().unwrap();
    let stored: SummaryDoc = serde_json::from_str(&session.summary).unwrap();
    assert_eq!(stored, doc);
    assert_eq!(stored.session_summary.homework_assigned, vec!["no coffee after 3pm"]);
}

#[tokio::test]
async fn patterns_with_no_analyzed_sessions_skip_generation() {
    let h = Harness::new().await;
    h.seed_session("s1", "u1").await;
    // Any call to the generation endpoint fails the test on server drop.
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let outcome = h.analysis().analyze_patterns("u1").await.unwrap();
    assert!(matches!(outcome, PatternOutcome::NoData));
}

#[tokio::test]
async fn patterns_assign_unique_stable_recommendation_ids() {
    let h = Harness::new().await;
    h.seed_session("s1", "u1").await;
    h.mount_completion(&analysis_content()).await;
    h.analysis().analyze_session("s1").await.unwrap();

    h.server.reset().await;
    h.mount_completion(&pattern_content()).await;

    let PatternOutcome::Analyzed(first) = h.analysis().analyze_patterns("u1").await.unwrap()
    else {
        panic!("expected analyzed outcome");
    };
    let first_id = first.long_term_patterns.recommendations[0].id.clone().unwrap();
    assert!(!first_id.is_empty());

    let profile = h.storage.get_profile("u1").await.unwrap().unwrap();
    let stored = profile.emotional_profile.long_term_analysis.unwrap();
    assert_eq!(stored.long_term_patterns.recommendations[0].id.as_deref(), Some(first_id.as_str()));

    // Re-running produces a fresh id for the fresh document, never reusing
    // or colliding with the one already persisted.
    let PatternOutcome::Analyzed(second) = h.analysis().analyze_patterns("u1").await.unwrap()
    else {
        panic!("expected analyzed outcome");
    };
    let second_id = second.long_term_patterns.recommendations[0].id.clone().unwrap();
    assert_ne!(first_id, second_id);

    let profile = h.storage.get_profile("u1").await.unwrap().unwrap();
    let history = &profile.emotional_profile.pattern_history;
    assert_eq!(history.len(), 2);
    assert_eq!(
        history[0].analysis.long_term_patterns.recommendations[0].id.as_deref(),
        Some(first_id.as_str())
    );
}

// ── Lifecycle & scheduling ───────────────────────────────────────

#[tokio::test]
async fn end_session_is_idempotent_and_schedules_follow_ups() {
    let h = Harness::new().await;
    h.seed_session("s1", "u1").await;

    let lifecycle = h.lifecycle();
    assert!(lifecycle.end_session("s1").await.unwrap());

    let session = h.storage.get_session("s1").await.unwrap().unwrap();
    assert!(!session.is_active);
    assert!(session.lifecycle_consistent());
    let ended_at = session.ended_at.unwrap();

    let jobs = h.pending_jobs().await;
    assert!(jobs.contains(&(JobKind::GenerateSummary, "s1".to_owned())));
    assert!(jobs.contains(&(JobKind::AnalyzePatterns, "u1".to_owned())));
    assert_eq!(jobs.len(), 2);

    // Second end: no-op, no new jobs, timestamp untouched.
    assert!(!lifecycle.end_session("s1").await.unwrap());
    assert_eq!(h.pending_jobs().await.len(), 2);
    assert_eq!(h.storage.get_session("s1").await.unwrap().unwrap().ended_at.unwrap(), ended_at);
}

#[tokio::test]
async fn tenth_message_triggers_pattern_analysis_once_per_count() {
    let h = Harness::new().await;
    h.seed_session("s1", "u1").await;
    let chat = h.chat();
    let lifecycle = h.lifecycle();

    for i in 0..9 {
        chat.record_user_message("s1", &format!("entry {i}")).await.unwrap();
    }
    assert!(!lifecycle.check_session_status("s1").await.unwrap());
    assert!(h.pending_jobs().await.is_empty());

    let (_msg, count) = chat.record_user_message("s1", "entry 9").await.unwrap();
    assert_eq!(count, 10);
    assert!(lifecycle.check_session_status("s1").await.unwrap());
    let jobs = h.pending_jobs().await;
    assert_eq!(jobs, vec![(JobKind::AnalyzePatterns, "u1".to_owned())]);

    // A sweep that sees the same count again must not re-fire.
    assert!(!lifecycle.check_session_status("s1").await.unwrap());
    assert_eq!(h.pending_jobs().await.len(), 1);

    // New activity past the threshold re-arms the trigger.
    chat.record_user_message("s1", "entry 10").await.unwrap();
    assert!(lifecycle.check_session_status("s1").await.unwrap());
    assert_eq!(h.pending_jobs().await.len(), 2);
}

#[tokio::test]
async fn stale_session_is_ended_by_the_sweep_path() {
    let h = Harness::new().await;
    let mut session = Session::new("s1".into(), "u1".into(), "t".into(), Utc::now());
    session.last_activity = Utc::now() - Duration::hours(25);
    h.storage.save_session(&session).await.unwrap();

    let lifecycle = h.lifecycle();
    assert_eq!(lifecycle.sweep_active_sessions().await.unwrap(), 1);
    let jobs = h.pending_jobs().await;
    assert_eq!(jobs, vec![(JobKind::CheckSessionStatus, "s1".to_owned())]);

    // Worker runs the check: inactivity exceeds 24h, an end job is queued.
    assert!(lifecycle.check_session_status("s1").await.unwrap());
    assert!(h.pending_jobs().await.contains(&(JobKind::EndSession, "s1".to_owned())));

    // Worker runs the end job: transition plus both follow-up jobs.
    assert!(lifecycle.end_session("s1").await.unwrap());
    let session = h.storage.get_session("s1").await.unwrap().unwrap();
    assert!(!session.is_active);
    assert!(session.ended_at.is_some());
    let jobs = h.pending_jobs().await;
    assert!(jobs.contains(&(JobKind::GenerateSummary, "s1".to_owned())));
    assert!(jobs.contains(&(JobKind::AnalyzePatterns, "u1".to_owned())));
}

#[tokio::test]
async fn ended_sessions_are_left_alone_by_the_sweep() {
    let h = Harness::new().await;
    h.seed_session("s1", "u1").await;
    h.lifecycle().end_session("s1").await.unwrap();

    // The ended session is not enumerated at all.
    assert_eq!(h.lifecycle().sweep_active_sessions().await.unwrap(), 0);
}

// ── Recommendation feedback ──────────────────────────────────────

#[tokio::test]
async fn feedback_round_trips_as_upsert() {
    let h = Harness::new().await;
    let profiles = h.profiles();

    // First submission for an unseen id appends.
    assert!(!profiles.record_feedback("u1", "rec-9", Feedback::Positive).await.unwrap());
    let profile = h.storage.get_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.recommendation_feedback.recommendations.len(), 1);
    let first_ts = profile.recommendation_feedback.recommendations[0].timestamp;

    // Second submission for the same id updates in place.
    assert!(profiles.record_feedback("u1", "rec-9", Feedback::Negative).await.unwrap());
    let profile = h.storage.get_profile("u1").await.unwrap().unwrap();
    let records = &profile.recommendation_feedback.recommendations;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].feedback, Feedback::Negative);
    assert!(records[0].timestamp >= first_ts);
}
