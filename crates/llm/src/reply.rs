use haven_core::{EmotionalProfile, Message};

use crate::ai_types::{ChatMessage, ChatRequest};
use crate::client::LlmClient;
use crate::error::LlmError;

const REPLY_TEMPERATURE: f32 = 0.7;
const REPLY_MAX_TOKENS: u32 = 500;

impl LlmClient {
    /// Generate the assistant's next turn for a session.
    ///
    /// The prompt is the full ordered history bracketed by a system
    /// instruction carrying the user's current profile snapshot and the
    /// session's running summary (or an explicit no-context marker), with
    /// the new user message appended last.
    ///
    /// # Errors
    /// Returns an error if the upstream call fails; nothing is persisted
    /// here, so callers can safely re-dispatch.
    pub async fn generate_reply(
        &self,
        profile: &EmotionalProfile,
        session_summary: &str,
        history: &[Message],
        user_text: &str,
    ) -> Result<String, LlmError> {
        let profile_snapshot = serde_json::to_string(profile).map_err(LlmError::Serialization)?;
        let context =
            if session_summary.is_empty() { "No previous context" } else { session_summary };
        let system = format!(
            "You are an empathetic AI therapist. The user's emotional profile shows: {profile_snapshot}\n\
             Previous conversation context: {context}\n\
             Respond in a therapeutic manner, showing understanding and providing gentle guidance."
        );

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::new("system", system));
        for msg in history {
            messages.push(ChatMessage::new(msg.role.as_str(), msg.content.clone()));
        }
        messages.push(ChatMessage::new("user", user_text.to_owned()));

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: REPLY_TEMPERATURE,
            max_tokens: REPLY_MAX_TOKENS,
            response_format: None,
        };
        self.chat_completion(&request).await
    }
}
