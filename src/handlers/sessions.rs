use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;

use crate::auth::Identity;
use crate::database::{SessionDraft, SessionStore};
use crate::error::ApiError;

/// POST /api/sessions - store a session attributed to the caller.
///
/// Only reachable through the bearer auth middleware, so the Identity
/// extension is always present. Returns 201 with the stored record and a
/// Location pointing at it.
pub async fn create(
    Extension(store): Extension<SessionStore>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    let draft: SessionDraft = serde_json::from_value(payload)
        .map_err(|e| ApiError::bad_request(format!("Invalid session body: {}", e)))?;

    // userId comes from the verified token, never from the body. A token
    // whose claims omit uid stores null rather than being rejected.
    let user_id = identity.uid().map(str::to_string);

    let session = store.insert(draft, user_id).await?;
    let location = session_location(session.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(session),
    )
        .into_response())
}

/// Canonical locator for a created session
fn session_location(id: i32) -> String {
    format!("api/sessions/{}", id)
}
