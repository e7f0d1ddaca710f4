use std::sync::Arc;

use chrono::Utc;
use haven_core::{Message, Role};
use haven_llm::LlmClient;
use haven_storage::Storage;
use haven_storage::traits::{MessageStore, ProfileStore, SessionStore};

use crate::ServiceError;

/// Conversation turns: persisting inbound messages and generating replies.
pub struct ChatService {
    storage: Arc<Storage>,
    llm: Arc<LlmClient>,
}

impl ChatService {
    #[must_use]
    pub const fn new(storage: Arc<Storage>, llm: Arc<LlmClient>) -> Self {
        Self { storage, llm }
    }

    /// Persist an inbound user message. Activity and message count are
    /// bumped unconditionally before any scheduling decision looks at them.
    /// Returns the stored message and the session's new message count.
    pub async fn record_user_message(
        &self,
        session_id: &str,
        content: &str,
    ) -> Result<(Message, i64), ServiceError> {
        let now = Utc::now();
        let count = SessionStore::record_session_activity(&*self.storage, session_id, now)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("session {session_id}")))?;
        let message = MessageStore::append_message(&*self.storage, &uuid::Uuid::new_v4().to_string(), session_id, Role::User, content, now)
            .await?;
        Ok((message, count))
    }

    /// Generate and persist the assistant's reply to `user_text`.
    ///
    /// On success exactly one assistant message is appended (and counted as
    /// session activity); on failure nothing is persisted and the caller may
    /// re-dispatch the job.
    pub async fn generate_reply(
        &self,
        session_id: &str,
        user_text: &str,
    ) -> Result<String, ServiceError> {
        let session = SessionStore::get_session(&*self.storage, session_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("session {session_id}")))?;
        let profile = ProfileStore::get_profile(&*self.storage, &session.user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("profile for user {}", session.user_id)))?;
        let history = MessageStore::get_session_messages(&*self.storage, session_id).await?;

        let reply = self
            .llm
            .generate_reply(&profile.emotional_profile, &session.summary, &history, user_text)
            .await?;

        let now = Utc::now();
        MessageStore::append_message(
                &*self.storage,
                &uuid::Uuid::new_v4().to_string(),
                session_id,
                Role::Assistant,
                &reply,
                now,
            )
            .await?;
        SessionStore::record_session_activity(&*self.storage, session_id, now).await?;
        tracing::info!(session_id, "assistant reply persisted");
        Ok(reply)
    }
}
