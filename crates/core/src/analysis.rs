//! Typed documents produced by the analysis prompts.
//!
//! The generation capability returns untrusted text; these types are the
//! schema it is asked to match. Every field the model might omit carries
//! `#[serde(default)]` so a sparse-but-valid document still parses; a
//! document that is not JSON at all, or contradicts the field types, is a
//! parse failure handled at the LLM boundary.

use serde::{Deserialize, Serialize};

/// 1-10 intensity scores for the fixed set of tracked emotions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntensityLevels {
    #[serde(default)]
    pub anxiety: Option<u8>,
    #[serde(default)]
    pub stress: Option<u8>,
    #[serde(default)]
    pub depression: Option<u8>,
    #[serde(default)]
    pub hope: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalThemes {
    #[serde(default)]
    pub primary_emotions: Vec<String>,
    #[serde(default)]
    pub intensity_levels: IntensityLevels,
    #[serde(default)]
    pub emotional_progression: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressNotes {
    #[serde(default)]
    pub insights_gained: Vec<String>,
    #[serde(default)]
    pub coping_strategies: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

/// Per-session emotional analysis. Persisted on the session and folded into
/// the owner's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisDoc {
    pub summary: String,
    #[serde(default)]
    pub emotional_themes: EmotionalThemes,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub progress: ProgressNotes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub topic: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub techniques_suggested: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummaryBody {
    #[serde(default)]
    pub topics_discussed: Vec<TopicSummary>,
    #[serde(default)]
    pub homework_assigned: Vec<String>,
    #[serde(default)]
    pub follow_up_topics: Vec<String>,
    #[serde(default)]
    pub progress_made: Vec<String>,
}

/// End-of-session summary. Serialized whole into the session's `summary`
/// field (full replace, never merged).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryDoc {
    pub session_summary: SessionSummaryBody,
}

/// Direction of an emotion across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    #[serde(alias = "Increasing")]
    Increasing,
    #[serde(alias = "Decreasing")]
    Decreasing,
    #[serde(alias = "Stable")]
    Stable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionTrend {
    pub emotion: String,
    pub trend: TrendDirection,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub coping_effectiveness: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalTrends {
    #[serde(default)]
    pub overall_progression: Option<String>,
    #[serde(default)]
    pub key_emotions: Vec<EmotionTrend>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringTheme {
    pub theme: String,
    #[serde(default)]
    pub frequency: Option<String>,
    /// Session ids where this theme appears.
    #[serde(default)]
    pub sessions: Vec<String>,
    #[serde(default)]
    pub progression: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressIndicator {
    pub area: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub current_status: Option<String>,
}

/// A suggested focus area for the user.
///
/// `id` is optional in the raw document; the analyzer assigns a fresh UUID
/// before persistence to any recommendation the model left unidentified, and
/// the id is never regenerated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub id: Option<String>,
    pub focus_area: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub suggested_approaches: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongTermPatterns {
    #[serde(default)]
    pub recurring_themes: Vec<RecurringTheme>,
    #[serde(default)]
    pub emotional_trends: EmotionalTrends,
    #[serde(default)]
    pub progress_indicators: Vec<ProgressIndicator>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TherapeuticInsights {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub breakthrough_moments: Vec<String>,
    #[serde(default)]
    pub areas_for_growth: Vec<String>,
}

/// Cross-session pattern analysis for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDoc {
    pub long_term_patterns: LongTermPatterns,
    #[serde(default)]
    pub therapeutic_insights: Option<TherapeuticInsights>,
}
