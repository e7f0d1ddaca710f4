//! Request/response bodies for the HTTP API.

use chrono::NaiveDate;
use haven_core::{GoalStatus, Message, Mood};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// 202-style response: the user message is stored, the reply and the status
/// check are queued. Outcomes are observed by re-reading the session.
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub message: Message,
    pub reply_job_id: i64,
    pub status_check_job_id: i64,
}

#[derive(Debug, Serialize)]
pub struct JobAcceptedResponse {
    pub job_id: i64,
}

#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    pub session_id: String,
    pub ended: bool,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    /// "positive" or "negative".
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub status: String,
    pub feedback: String,
    /// Pattern re-analysis job queued by negative feedback, if any.
    pub reanalysis_job_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGoalStatusRequest {
    pub status: GoalStatus,
}

#[derive(Debug, Deserialize)]
pub struct LogMoodRequest {
    pub mood: Mood,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct MoodQuery {
    pub limit: Option<usize>,
}
