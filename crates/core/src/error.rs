use thiserror::Error;

/// Errors from parsing domain enum representations.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid message role: {0}")]
    InvalidRole(String),
    #[error("invalid goal status: {0}")]
    InvalidGoalStatus(String),
    #[error("invalid mood: {0}")]
    InvalidMood(String),
    #[error("invalid feedback value: {0}")]
    InvalidFeedback(String),
}
