//! HTTP error mapping.

use crate::application::error::ApplicationError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}

/// Errors returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or invalid request.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or malformed credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Anything the client cannot fix.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        if err.is_validation() {
            Self::BadRequest(err.to_string())
        } else if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else {
            error!(error = %err, "request failed");
            Self::Internal("internal server error".to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ApplicationId;
    use crate::infrastructure::persistence::RepositoryError;

    #[test]
    fn maps_application_errors() {
        let not_found = ApplicationError::from(RepositoryError::not_found(
            "Application",
            ApplicationId::new_v4().to_string(),
        ));
        assert_eq!(ApiError::from(not_found).status(), StatusCode::NOT_FOUND);

        let validation = ApplicationError::validation("amount must be non-negative");
        assert_eq!(ApiError::from(validation).status(), StatusCode::BAD_REQUEST);

        let dependency = ApplicationError::from(RepositoryError::connection("pool closed"));
        let api = ApiError::from(dependency);
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.to_string(), "internal server error");
    }
}
