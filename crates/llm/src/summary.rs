use haven_core::{MAX_TRANSCRIPT_CHARS, SummaryDoc};

use crate::ai_types::{ChatMessage, ChatRequest, ResponseFormat};
use crate::analysis::{ANALYSIS_MAX_TOKENS, ANALYSIS_TEMPERATURE, parse_document};
use crate::client::{LlmClient, truncate};
use crate::error::LlmError;

impl LlmClient {
    /// Produce the end-of-session summary document from a timestamped
    /// transcript.
    ///
    /// # Errors
    /// Returns [`LlmError::SchemaParse`] on schema mismatch; upstream
    /// failures as usual.
    pub async fn summarize_session(&self, transcript: &str) -> Result<SummaryDoc, LlmError> {
        let prompt = format!(
            r#"Create a detailed summary of this therapy session in the following JSON format:
{{
    "session_summary": {{
        "topics_discussed": [
            {{
                "topic": "Main topic discussed",
                "time": "Time discussed",
                "key_points": ["List of key points"],
                "techniques_suggested": ["List of techniques or exercises suggested"]
            }}
        ],
        "homework_assigned": [
            "List of homework or exercises assigned"
        ],
        "follow_up_topics": [
            "Topics to discuss in next session"
        ],
        "progress_made": [
            "List of progress indicators"
        ]
    }}
}}

Conversation:
{}"#,
            truncate(transcript, MAX_TRANSCRIPT_CHARS)
        );

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::new("user", prompt)],
            temperature: ANALYSIS_TEMPERATURE,
            max_tokens: ANALYSIS_MAX_TOKENS,
            response_format: ResponseFormat::json_object(),
        };
        let content = self.chat_completion(&request).await?;
        parse_document(&content, "session summary")
    }
}
