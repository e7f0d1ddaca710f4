//! Service layer for haven
//!
//! Centralizes business logic between the HTTP/scheduler adapters and
//! storage/llm. Each service is a thin struct over `Arc<Storage>` (plus the
//! LLM client where generation is involved); all cross-job communication
//! goes through the durable store, never through shared memory.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod analysis_service;
mod chat_service;
mod error;
mod lifecycle_service;
mod profile_service;
mod queue_service;
mod wellness_service;

pub use analysis_service::{AnalysisService, PatternOutcome};
pub use chat_service::ChatService;
pub use error::ServiceError;
pub use lifecycle_service::{LifecyclePolicy, LifecycleService};
pub use profile_service::ProfileService;
pub use queue_service::QueueService;
pub use wellness_service::WellnessService;
