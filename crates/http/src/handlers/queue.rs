use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use haven_storage::QueueStats;

use crate::AppState;
use crate::api_error::ApiError;

pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<QueueStats>, ApiError> {
    Ok(Json(state.queue_service.get_queue_stats().await?))
}
