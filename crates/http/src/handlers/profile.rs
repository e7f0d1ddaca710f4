use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use haven_core::{Feedback, Profile};
use haven_storage::JobKind;

use super::caller_id;
use crate::AppState;
use crate::api_error::ApiError;
use crate::api_types::{FeedbackRequest, FeedbackResponse, JobAcceptedResponse};

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Profile>, ApiError> {
    let user_id = caller_id(&headers)?;
    Ok(Json(state.profile_service.get_or_create_profile(&user_id).await?))
}

pub async fn analyze_patterns(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<JobAcceptedResponse>), ApiError> {
    let user_id = caller_id(&headers)?;
    let job_id = state.queue_service.dispatch(JobKind::AnalyzePatterns, &user_id).await?;
    Ok((StatusCode::ACCEPTED, Json(JobAcceptedResponse { job_id })))
}

/// Record feedback on a recommendation. Negative feedback queues a fresh
/// pattern analysis so the next recommendation set can take it into account.
pub async fn feedback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(recommendation_id): Path<String>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let user_id = caller_id(&headers)?;
    let feedback: Feedback = req
        .feedback
        .parse()
        .map_err(|_| ApiError::BadRequest("feedback must be 'positive' or 'negative'".to_owned()))?;

    state.profile_service.record_feedback(&user_id, &recommendation_id, feedback).await?;

    let reanalysis_job_id = if feedback == Feedback::Negative {
        Some(state.queue_service.dispatch(JobKind::AnalyzePatterns, &user_id).await?)
    } else {
        None
    };

    Ok(Json(FeedbackResponse {
        status: "feedback recorded".to_owned(),
        feedback: feedback.as_str().to_owned(),
        reanalysis_job_id,
    }))
}

pub async fn check_in(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = caller_id(&headers)?;
    state.profile_service.check_in(&user_id).await?;
    Ok(Json(serde_json::json!({"status": "check-in recorded"})))
}
