//! Typed error enum for the service layer.
//!
//! Unifies storage and LLM failures into one type so the job runner and the
//! HTTP adapter can match on failure modes (not-found vs. transient upstream
//! vs. unparseable output) instead of downcasting opaque error boxes.

use haven_llm::LlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Referenced session/user/profile does not exist. Caller error: no
    /// mutation happened and retrying will not help.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller does not own the target resource.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Generation capability failed (upstream or schema parse).
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    /// Storage operation failed.
    #[error("storage: {0}")]
    Storage(#[from] anyhow::Error),

    /// Serialization failed in the service layer.
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Optimistic profile merge kept losing the version race.
    #[error("profile merge contention for user {user_id} after {attempts} attempts")]
    MergeContention { user_id: String, attempts: u32 },
}

impl ServiceError {
    /// Whether retrying the whole job is worthwhile.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Llm(e) => e.is_transient(),
            Self::MergeContention { .. } => true,
            _ => false,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the upstream answered but with output that failed schema
    /// validation. Treated as a no-op for persisted state and not retried.
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Llm(e) if e.is_parse())
    }
}
