//! # REST API
//!
//! axum endpoints for submitting and reading financing applications.
//!
//! # Endpoints
//!
//! - `GET /healthz` - Liveness, never authenticated
//! - `POST /api/applications` - Submit an application to every provider
//! - `GET /api/applications/{id}` - Application with its processed offers
//! - `POST /api/applications/statuses/refresh` - Run a reconciliation tick now
//! - `GET /ws/applications/{id}` - Live offer updates, see [`crate::api::ws`]

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use dto::{ApplicationRequest, ApplicationResponse, OfferResponse};
pub use error::{ApiError, ErrorResponse};
pub use handlers::AppState;
pub use routes::create_router;
