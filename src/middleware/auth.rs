use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthError, TokenValidator};
use crate::error::ApiError;

/// Bearer authentication middleware.
///
/// Extracts the credential from the Authorization header, validates it
/// against the trusted issuer, and injects the resulting [`Identity`]
/// into request extensions. Any failure short-circuits with 401 before
/// the handler runs.
///
/// [`Identity`]: crate::auth::Identity
pub async fn bearer_auth(
    State(validator): State<Arc<TokenValidator>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)?;
    let identity = validator.validate(&token).await?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Extract the bearer credential from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get("authorization")
        .ok_or(AuthError::MissingCredentials)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::MissingCredentials)?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        _ => Err(AuthError::MissingCredentials),
    }
}
