use haven_core::{AnalysisDoc, PatternDoc, Session};
use serde::Serialize;

use crate::ai_types::{ChatMessage, ChatRequest, ResponseFormat};
use crate::analysis::{ANALYSIS_TEMPERATURE, parse_document};
use crate::client::LlmClient;
use crate::error::LlmError;

const PATTERN_MAX_TOKENS: u32 = 1500;

/// The per-session slice of data the pattern prompt sees.
#[derive(Serialize)]
struct SessionSnapshot<'a> {
    session_id: &'a str,
    date: String,
    summary: &'a str,
    emotional_analysis: &'a AnalysisDoc,
}

impl LlmClient {
    /// Analyze recurring themes, emotional trends, and progress across a
    /// user's analyzed sessions. Callers are responsible for the no-data
    /// short-circuit; this method assumes at least one analyzed session.
    ///
    /// # Errors
    /// Returns [`LlmError::SchemaParse`] on schema mismatch; upstream
    /// failures as usual.
    pub async fn analyze_patterns(&self, sessions: &[Session]) -> Result<PatternDoc, LlmError> {
        let snapshots: Vec<SessionSnapshot<'_>> = sessions
            .iter()
            .filter_map(|s| {
                s.emotional_analysis.as_ref().map(|analysis| SessionSnapshot {
                    session_id: &s.id,
                    date: s.created_at.to_rfc3339(),
                    summary: &s.summary,
                    emotional_analysis: analysis,
                })
            })
            .collect();
        let sessions_data =
            serde_json::to_string_pretty(&snapshots).map_err(LlmError::Serialization)?;

        let prompt = format!(
            r#"Analyze the following therapy sessions and identify long-term patterns, trends, and progress.
Provide the analysis in the following JSON format:
{{
    "long_term_patterns": {{
        "recurring_themes": [
            {{
                "theme": "Theme name",
                "frequency": "How often it appears",
                "sessions": ["List of session IDs where this theme appears"],
                "progression": "How this theme has evolved over time"
            }}
        ],
        "emotional_trends": {{
            "overall_progression": "Description of emotional journey",
            "key_emotions": [
                {{
                    "emotion": "Emotion name",
                    "trend": "increasing/decreasing/stable",
                    "triggers": ["Common triggers identified"],
                    "coping_effectiveness": "How well user copes with this emotion"
                }}
            ]
        }},
        "progress_indicators": [
            {{
                "area": "Area of improvement",
                "description": "Description of progress",
                "evidence": ["Specific examples from sessions"],
                "current_status": "Current state"
            }}
        ],
        "recommendations": [
            {{
                "id": "unique_recommendation_id",
                "focus_area": "Area to focus on",
                "reason": "Why this is important",
                "suggested_approaches": ["Specific approaches to try"]
            }}
        ]
    }},
    "therapeutic_insights": {{
        "strengths": ["User's therapeutic strengths"],
        "challenges": ["Ongoing challenges"],
        "breakthrough_moments": ["Key moments of insight or progress"],
        "areas_for_growth": ["Areas needing more attention"]
    }}
}}

Sessions Data:
{sessions_data}"#
        );

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::new("user", prompt)],
            temperature: ANALYSIS_TEMPERATURE,
            max_tokens: PATTERN_MAX_TOKENS,
            response_format: ResponseFormat::json_object(),
        };
        let content = self.chat_completion(&request).await?;
        parse_document(&content, "pattern analysis")
    }
}
