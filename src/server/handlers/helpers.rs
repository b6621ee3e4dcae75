//! Response helpers shared by handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// `{"detail": ...}` body used by the lookup endpoints.
pub fn detail_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "detail": detail.into() })),
    )
        .into_response()
}

/// `{"error": ...}` body used by the upload endpoint.
pub fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": error.into() }))).into_response()
}
