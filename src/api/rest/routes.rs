//! Router assembly.

use crate::api::rest::handlers::{self, AppState};
use crate::api::rest::middleware::require_bearer;
use crate::api::ws;
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the HTTP router.
///
/// `/healthz` is always public. With `auth_enabled` every other route
/// requires a bearer token.
pub fn create_router(state: AppState, auth_enabled: bool) -> Router {
    let mut protected = Router::new()
        .route("/api/applications", post(handlers::submit_application))
        .route(
            "/api/applications/statuses/refresh",
            post(handlers::refresh_statuses),
        )
        .route("/api/applications/{id}", get(handlers::get_application))
        .route("/ws/applications/{id}", get(ws::subscribe));

    if auth_enabled {
        protected = protected.route_layer(middleware::from_fn(require_bearer));
    }

    Router::new()
        .route("/healthz", get(handlers::health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
