//! HTTP adapter for haven.
//!
//! A thin axum layer over the service crate: request handlers validate
//! ownership, enqueue jobs, and read persisted state. Job outcomes are
//! observed by re-reading records, never returned synchronously. The
//! background worker loop and the sweep scheduler also live here, next to
//! the server that hosts them.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]

pub mod api_error;
mod api_types;
mod handlers;
mod scheduler;
mod worker;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use axum::routing::{get, post, put};
use axum::{Json, Router};
use tokio::sync::Semaphore;
use tower_http::cors::CorsLayer;

use haven_llm::LlmClient;
use haven_service::{
    AnalysisService, ChatService, LifecyclePolicy, LifecycleService, ProfileService, QueueService,
    WellnessService,
};
use haven_storage::Storage;

pub use api_types::*;
pub use scheduler::start_sweep_scheduler;
pub use worker::{max_queue_workers, run_job, run_startup_recovery, start_background_processor};

/// Shared application state for handlers and the worker loop.
pub struct AppState {
    /// Bounds concurrent job execution.
    pub semaphore: Arc<Semaphore>,
    /// Flag indicating whether the worker loop should claim jobs.
    pub processing_active: AtomicBool,
    pub storage: Arc<Storage>,
    pub chat_service: Arc<ChatService>,
    pub analysis_service: Arc<AnalysisService>,
    pub lifecycle_service: Arc<LifecycleService>,
    pub profile_service: Arc<ProfileService>,
    pub wellness_service: Arc<WellnessService>,
    pub queue_service: Arc<QueueService>,
}

impl AppState {
    /// Wire all services over one storage handle and one LLM client.
    #[must_use]
    pub fn new(storage: Arc<Storage>, llm: Arc<LlmClient>, policy: LifecyclePolicy) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(worker::max_queue_workers())),
            processing_active: AtomicBool::new(true),
            chat_service: Arc::new(ChatService::new(Arc::clone(&storage), Arc::clone(&llm))),
            analysis_service: Arc::new(AnalysisService::new(Arc::clone(&storage), llm)),
            lifecycle_service: Arc::new(LifecycleService::new(Arc::clone(&storage), policy)),
            profile_service: Arc::new(ProfileService::new(Arc::clone(&storage))),
            wellness_service: Arc::new(WellnessService::new(Arc::clone(&storage))),
            queue_service: Arc::new(QueueService::new(Arc::clone(&storage))),
            storage,
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/sessions", post(handlers::sessions::create_session).get(handlers::sessions::list_sessions))
        .route("/api/sessions/{id}", get(handlers::sessions::get_session))
        .route(
            "/api/sessions/{id}/messages",
            get(handlers::sessions::list_messages).post(handlers::sessions::send_message),
        )
        .route("/api/sessions/{id}/end", post(handlers::sessions::end_session))
        .route("/api/sessions/{id}/analyze", post(handlers::sessions::analyze_session))
        .route("/api/sessions/{id}/status", post(handlers::sessions::check_status))
        .route("/api/profile", get(handlers::profile::get_profile))
        .route("/api/patterns", post(handlers::profile::analyze_patterns))
        .route("/api/recommendations/{id}/feedback", post(handlers::profile::feedback))
        .route("/api/check-in", post(handlers::profile::check_in))
        .route("/api/goals", get(handlers::wellness::list_goals).post(handlers::wellness::create_goal))
        .route("/api/goals/{id}/status", put(handlers::wellness::update_goal_status))
        .route("/api/moods", get(handlers::wellness::list_moods).post(handlers::wellness::log_mood))
        .route("/api/queue/stats", get(handlers::queue::stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
