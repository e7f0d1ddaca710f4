//! Generation-capability client for haven.
//!
//! One HTTP client, four operations: free-text therapeutic replies, and the
//! three JSON-constrained analysis prompts (per-session analysis, session
//! summary, long-term patterns). The upstream service is treated as
//! untrusted: transient HTTP failures retry with backoff inside the client,
//! and output that does not match the requested schema surfaces as
//! [`LlmError::SchemaParse`] rather than a crash.

mod ai_types;
mod analysis;
mod client;
mod error;
mod patterns;
mod reply;
mod summary;


pub use client::{DEFAULT_MODEL, LlmClient};
pub use error::LlmError;
