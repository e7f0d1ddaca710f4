use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use haven_core::{Goal, MoodLog};

use super::caller_id;
use crate::AppState;
use crate::api_error::ApiError;
use crate::api_types::{CreateGoalRequest, LogMoodRequest, MoodQuery, UpdateGoalStatusRequest};

const DEFAULT_MOOD_LIMIT: usize = 50;

pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<Goal>), ApiError> {
    let user_id = caller_id(&headers)?;
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_owned()));
    }
    let goal = state
        .wellness_service
        .create_goal(&user_id, &req.title, &req.description, req.target_date)
        .await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Goal>>, ApiError> {
    let user_id = caller_id(&headers)?;
    Ok(Json(state.wellness_service.list_goals(&user_id).await?))
}

pub async fn update_goal_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(goal_id): Path<String>,
    Json(req): Json<UpdateGoalStatusRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = caller_id(&headers)?;
    state.wellness_service.set_goal_status(&user_id, &goal_id, req.status).await?;
    Ok(Json(serde_json::json!({"status": "updated"})))
}

pub async fn log_mood(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<LogMoodRequest>,
) -> Result<(StatusCode, Json<MoodLog>), ApiError> {
    let user_id = caller_id(&headers)?;
    let log = state.wellness_service.log_mood(&user_id, req.mood, &req.note).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

pub async fn list_moods(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<MoodQuery>,
) -> Result<Json<Vec<MoodLog>>, ApiError> {
    let user_id = caller_id(&headers)?;
    let limit = query.limit.unwrap_or(DEFAULT_MOOD_LIMIT);
    Ok(Json(state.wellness_service.list_moods(&user_id, limit).await?))
}
