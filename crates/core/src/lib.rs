//! Core domain types for haven
//!
//! This crate contains the types shared across all other crates: sessions,
//! messages, the typed analysis documents produced by the LLM boundary, and
//! the per-user emotional profile aggregate with its pure merge operations.

mod analysis;
mod constants;
mod env_config;
mod error;
mod json_utils;
mod message;
mod profile;
mod session;
mod wellness;

pub use analysis::*;
pub use constants::*;
pub use env_config::env_parse_with_default;
pub use error::DomainError;
pub use json_utils::strip_markdown_json;
pub use message::*;
pub use profile::*;
pub use session::Session;
pub use wellness::*;
