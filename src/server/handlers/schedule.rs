//! Group lookup endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::super::AppState;
use super::helpers::detail_response;
use crate::models::Shift;
use crate::services::QueryError;

/// Wording of validation failures for one endpoint.
struct Messages {
    missing_group: &'static str,
    missing_shift: &'static str,
}

const SCHEDULE_MESSAGES: Messages = Messages {
    missing_group: "нет такой группы",
    missing_shift: "не указана смена",
};

const ALICE_MESSAGES: Messages = Messages {
    missing_group: "Вы не указали название группы.",
    missing_shift: "Вы не указали номер смены.",
};

const NOT_FOUND_MESSAGE: &str = "урок для данной группы не найден";

/// Loose request body of `/schedule`: either field may be absent.
#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub group: Option<String>,
    pub shift: Option<Value>,
}

/// Request body of `/alice_schedule`, checked against a fixed shape.
#[derive(Debug, Deserialize)]
pub struct AliceScheduleRequest {
    pub group: String,
    /// Integers, integral floats, booleans and numeric strings are all accepted.
    #[serde(deserialize_with = "lenient_integer")]
    pub shift: i64,
}

fn lenient_integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    integer_from_json(&value)
        .ok_or_else(|| D::Error::custom(format!("invalid integer: {}", value)))
}

/// Integer reading of a JSON value, if it has an exact one.
fn integer_from_json(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64)
                .map(|n| n as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Lessons for a group as JSON records.
pub async fn group_schedule(
    State(state): State<AppState>,
    body: Result<Json<ScheduleRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return detail_response(rejection.status(), rejection.body_text()),
    };

    let shift = shift_from_json(request.shift.as_ref());
    let schedules = state.schedules.clone();
    let result = tokio::task::spawn_blocking(move || {
        schedules.lessons(request.group.as_deref(), shift)
    })
    .await;

    match result {
        Ok(Ok(lessons)) => Json(lessons).into_response(),
        Ok(Err(e)) => query_error_response(e, &SCHEDULE_MESSAGES),
        Err(e) => lookup_task_failed(e),
    }
}

/// Lessons for a group as text for a voice assistant.
///
/// A group without lessons still gets a 200 with an apology.
pub async fn alice_schedule(
    State(state): State<AppState>,
    body: Result<Json<AliceScheduleRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return detail_response(rejection.status(), rejection.body_text()),
    };

    let shift = Shift::from_number(request.shift);
    let schedules = state.schedules.clone();
    let result =
        tokio::task::spawn_blocking(move || schedules.narrative(Some(&request.group), shift))
            .await;

    match result {
        Ok(Ok(text)) => Json(serde_json::json!({ "text": text })).into_response(),
        Ok(Err(e)) => query_error_response(e, &ALICE_MESSAGES),
        Err(e) => lookup_task_failed(e),
    }
}

fn lookup_task_failed(error: tokio::task::JoinError) -> Response {
    tracing::error!("Lookup task failed: {}", error);
    detail_response(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}

fn query_error_response(error: QueryError, messages: &Messages) -> Response {
    match error {
        QueryError::MissingGroup => {
            tracing::warn!("Lookup without group");
            detail_response(StatusCode::BAD_REQUEST, messages.missing_group)
        }
        QueryError::MissingShift => {
            tracing::warn!("Lookup without shift");
            detail_response(StatusCode::BAD_REQUEST, messages.missing_shift)
        }
        QueryError::NotFound(group) => {
            tracing::debug!("No lessons for group {:?}", group);
            detail_response(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
        }
        QueryError::Store(e) => {
            tracing::error!("Failed to load schedule: {}", e);
            detail_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Interpret a loosely typed shift value.
///
/// Absent, null, zero, false and empty values mean "no shift". Numbers (and
/// `true`, which counts as 1) map through [`Shift::from_number`]; any other
/// value is accepted as an unrecognized shift.
fn shift_from_json(value: Option<&Value>) -> Option<Shift> {
    let value = value?;
    if let Value::Number(_) | Value::Bool(_) = value {
        return match integer_from_json(value) {
            Some(n) => Shift::from_number(n),
            None => Some(Shift::Unrecognized),
        };
    }

    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(fields) if fields.is_empty() => None,
        _ => Some(Shift::Unrecognized),
    }
}
