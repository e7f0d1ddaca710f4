//! Typed error enum for the LLM crate.

use thiserror::Error;

/// Errors from generation-capability operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("empty response: no choices returned")]
    EmptyResponse,
    #[error("response envelope parse error ({context}): {source}")]
    ResponseParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    /// Generation succeeded but the returned text did not match the requested
    /// schema. Recoverable: callers treat it as a no-op for persisted state.
    #[error("schema parse error in {context}: {source}")]
    SchemaParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("serialization failed: {0}")]
    Serialization(serde_json::Error),
    #[error("client initialization failed: {0}")]
    ClientInit(String),
    #[error("all retries exhausted, last error: {0}")]
    RetriesExhausted(Box<LlmError>),
}

impl LlmError {
    /// Whether this error is transient and the whole operation is safe to
    /// retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(_) => true,
            Self::HttpStatus { code, .. } => matches!(code, 429 | 500 | 502 | 503 | 529),
            _ => false,
        }
    }

    /// Whether the upstream answered but with output that failed schema
    /// validation.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::SchemaParse { .. })
    }
}
