use haven_core::{AnalysisDoc, MAX_TRANSCRIPT_CHARS, strip_markdown_json};

use crate::ai_types::{ChatMessage, ChatRequest, ResponseFormat};
use crate::client::{LlmClient, truncate};
use crate::error::LlmError;

pub(crate) const ANALYSIS_TEMPERATURE: f32 = 0.3;
pub(crate) const ANALYSIS_MAX_TOKENS: u32 = 1000;

/// Parse generation output as a typed document, tolerating markdown fences.
pub(crate) fn parse_document<T: serde::de::DeserializeOwned>(
    content: &str,
    context: &str,
) -> Result<T, LlmError> {
    let stripped = strip_markdown_json(content);
    serde_json::from_str(stripped).map_err(|e| LlmError::SchemaParse {
        context: format!("{context} (content: {})", truncate(stripped, 300)),
        source: e,
    })
}

impl LlmClient {
    /// Analyze one session's transcript into an [`AnalysisDoc`].
    ///
    /// # Errors
    /// Returns [`LlmError::SchemaParse`] when the model's output is not a
    /// document of the requested shape; upstream failures as usual.
    pub async fn analyze_conversation(&self, transcript: &str) -> Result<AnalysisDoc, LlmError> {
        let prompt = format!(
            r#"Analyze this therapy session and provide a detailed analysis in the following JSON format:
{{
    "summary": "A concise summary of the main topics and progress in the session",
    "emotional_themes": {{
        "primary_emotions": ["list of main emotions detected"],
        "intensity_levels": {{
            "anxiety": 1-10,
            "stress": 1-10,
            "depression": 1-10,
            "hope": 1-10
        }},
        "emotional_progression": "Description of how emotions changed during the session"
    }},
    "concerns": [
        "List of specific concerns or issues identified"
    ],
    "progress": {{
        "insights_gained": ["Key realizations or insights"],
        "coping_strategies": ["Strategies discussed or learned"],
        "next_steps": ["Suggested next steps or homework"]
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
        parse_document(&content, "session analysis")
    }
}
