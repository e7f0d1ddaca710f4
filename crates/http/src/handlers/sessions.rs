use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use haven_core::{Message, Session};
use haven_storage::traits::{MessageStore, ProfileStore, SessionStore};
use haven_storage::JobKind;

use super::caller_id;
use crate::api_error::ApiError;
use crate::api_types::{
    CreateSessionRequest, EndSessionResponse, JobAcceptedResponse, SendMessageRequest,
    SendMessageResponse,
};
use crate::AppState;

/// Load a session and verify the caller owns it.
async fn owned_session(
    state: &AppState,
    session_id: &str,
    user_id: &str,
) -> Result<Session, ApiError> {
    let session = state
        .storage
        .get_session(session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("session {session_id} not found")))?;
    if session.user_id != user_id {
        return Err(ApiError::Forbidden("session belongs to another user".to_owned()));
    }
    Ok(session)
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let user_id = caller_id(&headers)?;
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_owned()));
    }

    let now = Utc::now();
    let session = Session::new(uuid::Uuid::new_v4().to_string(), user_id.clone(), req.title, now);
    state.storage.save_session(&session).await?;
    // Reply generation needs a profile; create it with the first session.
    state.storage.ensure_profile(&user_id, now).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Session>>, ApiError> {
    let user_id = caller_id(&headers)?;
    Ok(Json(state.storage.get_user_sessions(&user_id).await?))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    let user_id = caller_id(&headers)?;
    Ok(Json(owned_session(&state, &session_id, &user_id).await?))
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let user_id = caller_id(&headers)?;
    owned_session(&state, &session_id, &user_id).await?;
    Ok(Json(state.storage.get_session_messages(&session_id).await?))
}

/// Persist the inbound message, then queue the reply and a status check.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>), ApiError> {
    let user_id = caller_id(&headers)?;
    if req.content.trim().is_empty() {
        return Err(ApiError::BadRequest("content is required".to_owned()));
    }
    owned_session(&state, &session_id, &user_id).await?;

    let (message, _count) = state.chat_service.record_user_message(&session_id, &req.content).await?;
    let reply_job_id = state.queue_service.dispatch_reply(&session_id, &req.content).await?;
    let status_check_job_id =
        state.queue_service.dispatch(JobKind::CheckSessionStatus, &session_id).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SendMessageResponse { message, reply_job_id, status_check_job_id }),
    ))
}

/// Explicit end request: the transition happens now, the summary and
/// pattern jobs are queued by the lifecycle service.
pub async fn end_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Result<Json<EndSessionResponse>, ApiError> {
    let user_id = caller_id(&headers)?;
    owned_session(&state, &session_id, &user_id).await?;

    let ended = state.lifecycle_service.end_session(&session_id).await?;
    if !ended {
        return Err(ApiError::BadRequest("session already ended".to_owned()));
    }
    Ok(Json(EndSessionResponse { session_id, ended }))
}

pub async fn analyze_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Result<(StatusCode, Json<JobAcceptedResponse>), ApiError> {
    let user_id = caller_id(&headers)?;
    owned_session(&state, &session_id, &user_id).await?;

    let job_id = state.queue_service.dispatch(JobKind::AnalyzeSession, &session_id).await?;
    Ok((StatusCode::ACCEPTED, Json(JobAcceptedResponse { job_id })))
}

pub async fn check_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Result<(StatusCode, Json<JobAcceptedResponse>), ApiError> {
    let user_id = caller_id(&headers)?;
    owned_session(&state, &session_id, &user_id).await?;

    let job_id = state.queue_service.dispatch(JobKind::CheckSessionStatus, &session_id).await?;
    Ok((StatusCode::ACCEPTED, Json(JobAcceptedResponse { job_id })))
}
