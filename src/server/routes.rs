//! Router configuration for the web server.

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

use super::handlers;
use super::AppState;

/// Upper bound for an uploaded timetable document.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.allowed_origin.clone());

    Router::new()
        .route("/health", get(handlers::health))
        .route("/upload", post(handlers::upload_schedule))
        .route("/schedule", post(handlers::group_schedule))
        .route("/alice_schedule", post(handlers::alice_schedule))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

/// CORS for a single origin, with credentials.
///
/// Credentials rule out wildcards, so methods and headers mirror the preflight.
fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
