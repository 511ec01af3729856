//! Request authentication.

use crate::api::rest::error::ApiError;
use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

const BEARER_PREFIX: &str = "Bearer ";

/// Rejects requests without an `Authorization: Bearer <token>` header.
///
/// Only presence and shape are checked; the token itself is not verified.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` if the header is missing or malformed.
pub async fn require_bearer(request: Request, next: Next) -> Result<Response, ApiError> {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .is_some_and(|token| !token.is_empty());

    if !authorized {
        debug!(path = %request.uri().path(), "rejected unauthenticated request");
        return Err(ApiError::Unauthorized(
            "invalid authorization header".to_string(),
        ));
    }
    Ok(next.run(request).await)
}
