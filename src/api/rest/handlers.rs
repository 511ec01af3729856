//! Route handlers.

use crate::api::rest::dto::{ApplicationRequest, ApplicationResponse};
use crate::api::rest::error::ApiError;
use crate::application::services::{ApplicationService, TickReport};
use crate::domain::value_objects::ApplicationId;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Aggregation facade.
    pub service: Arc<ApplicationService>,
}

impl AppState {
    /// Wraps the service.
    #[must_use]
    pub fn new(service: Arc<ApplicationService>) -> Self {
        Self { service }
    }
}

/// `GET /healthz`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /api/applications`
///
/// # Errors
///
/// 400 on an invalid body, 500 if the application cannot be stored.
pub async fn submit_application(
    State(state): State<AppState>,
    payload: Result<Json<ApplicationRequest>, JsonRejection>,
) -> Result<Json<ApplicationResponse>, ApiError> {
    let Json(request) = payload?;
    let (applicant, amount) = request.into_applicant().map_err(ApiError::BadRequest)?;
    let application = state.service.submit_application(applicant, amount).await?;
    Ok(Json(ApplicationResponse::from(&application)))
}

/// `GET /api/applications/{id}`
///
/// # Errors
///
/// 400 on a malformed ID, 404 if unknown.
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApplicationResponse>, ApiError> {
    let id = parse_application_id(&id)?;
    let application = state.service.get_application(id).await?;
    Ok(Json(ApplicationResponse::from(&application)))
}

/// `POST /api/applications/statuses/refresh`
///
/// # Errors
///
/// 500 if pending offers cannot be listed.
pub async fn refresh_statuses(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<TickReport>), ApiError> {
    let report = state.service.update_application_statuses().await?;
    Ok((StatusCode::ACCEPTED, Json(report)))
}

pub(crate) fn parse_application_id(raw: &str) -> Result<ApplicationId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid application id '{raw}'")))
}
