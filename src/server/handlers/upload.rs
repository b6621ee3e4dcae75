//! Timetable upload endpoint.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::super::AppState;
use super::helpers::{detail_response, error_response};
use crate::services::{import_document, UploadError};

/// Multipart field carrying the document.
const FILE_FIELD: &str = "file";

/// Replace the current schedule with the tables of an uploaded .docx.
pub async fn upload_schedule(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let (filename, content) = match read_file_field(&mut multipart).await {
        Ok(Some(file)) => file,
        Ok(None) => {
            return detail_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Field '{}' is required", FILE_FIELD),
            )
        }
        Err(e) => return error_response(e.status(), e.body_text()),
    };

    let store = state.store.clone();
    let name = filename.clone();
    let result =
        tokio::task::spawn_blocking(move || import_document(&store, &name, &content)).await;

    match result {
        Ok(Ok(schedule)) => Json(serde_json::json!({ "schedule": schedule })).into_response(),
        Ok(Err(e @ UploadError::UnsupportedFileType(_))) => {
            tracing::warn!("Rejected upload {:?}: {}", filename, e);
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Ok(Err(e)) => {
            tracing::error!("Upload of {:?} failed: {}", filename, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            tracing::error!("Upload task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Find the document field and read it whole.
async fn read_file_field(
    multipart: &mut Multipart,
) -> Result<Option<(String, Vec<u8>)>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field.bytes().await?;
        return Ok(Some((filename, content.to_vec())));
    }
    Ok(None)
}
