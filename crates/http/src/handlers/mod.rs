pub(crate) mod profile;
pub(crate) mod queue;
pub(crate) mod sessions;
pub(crate) mod wellness;

use axum::http::HeaderMap;

use crate::api_error::ApiError;

/// Caller identity from the `x-user-id` header. Authentication proper lives
/// in front of this service; the header is the resolved identity.
pub(crate) fn caller_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| ApiError::BadRequest("missing x-user-id header".to_owned()))
}
