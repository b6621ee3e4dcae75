//! Web server for timetable upload and group lookups.
//!
//! Endpoints:
//! - `POST /upload`: replace the current schedule with an uploaded .docx
//! - `POST /schedule`: lessons for a group as JSON records
//! - `POST /alice_schedule`: lessons for a group as spoken text
//! - `GET /health`: liveness probe

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;

use crate::config::Settings;
use crate::services::ScheduleService;
use crate::storage::ScheduleStore;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ScheduleStore>,
    pub schedules: Arc<ScheduleService>,
    /// The single origin browsers may call from.
    pub allowed_origin: HeaderValue,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let store = Arc::new(ScheduleStore::new(settings.schedule_path()));
        let allowed_origin = HeaderValue::from_str(&settings.allowed_origin).map_err(|e| {
            anyhow::anyhow!("Invalid allowed origin {:?}: {}", settings.allowed_origin, e)
        })?;

        Ok(Self {
            schedules: Arc::new(ScheduleService::new(store.clone())),
            store,
            allowed_origin,
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!(
        "Starting server at http://{} (schedule file {})",
        addr,
        settings.schedule_path().display()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::docx::fixtures::{declare_part_size, docx_with_table};

    const BOUNDARY: &str = "timetable-test-boundary";

    fn setup_test_app() -> (axum::Router, AppState, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let settings = Settings::with_data_dir(dir.path().join("uploaded_schedules"));
        let state = AppState::new(&settings).unwrap();
        (create_router(state.clone()), state, dir)
    }

    fn setup_test_app_with_data() -> (axum::Router, AppState, tempfile::TempDir) {
        let (app, state, dir) = setup_test_app();
        state
            .store
            .save(&[vec![
                "101".to_string(),
                "Иванов".to_string(),
                "Группа А".to_string(),
                "Петров".to_string(),
                "Группа Б".to_string(),
            ]])
            .unwrap();
        (app, state, dir)
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn upload_request(filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _state, _dir) = setup_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_then_query() {
        let (app, state, _dir) = setup_test_app();
        let doc = docx_with_table(&[&["101", "Иванов", "Группа А", "Петров", "Группа Б"]]);

        let response = app
            .clone()
            .oneshot(upload_request("01.09.2024 schedule.docx", &doc))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(
            json["schedule"],
            serde_json::json!([["101", "Иванов", "Группа А", "Петров", "Группа Б"]])
        );
        assert!(state.store.path().exists());

        let response = app
            .oneshot(json_request(
                "/schedule",
                serde_json::json!({ "group": "Группа А", "shift": 1 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let lessons = json.as_array().unwrap();
        assert_eq!(lessons.len(), 1);
        assert_eq!(lessons[0]["group"], "Группа А");
        assert_eq!(lessons[0]["cabinet"], "101");
        assert_eq!(lessons[0]["teacher"], "Иванов");
        assert_eq!(lessons[0]["time"], "09:30 - 10:50, 2 пара");
    }

    #[tokio::test]
    async fn test_upload_rejects_other_extensions() {
        let (app, state, _dir) = setup_test_app();

        let response = app
            .oneshot(upload_request("01.09.2024 schedule.txt", b"text"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "Only .docx files are supported");
        assert!(!state.store.path().exists());
    }

    #[tokio::test]
    async fn test_upload_bad_date_is_server_error() {
        let (app, state, _dir) = setup_test_app();
        let doc = docx_with_table(&[&["101"]]);

        let response = app
            .oneshot(upload_request("schedule.docx", &doc))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(
            json["error"],
            "time data 'schedule.docx' does not match format '%d.%m.%Y'"
        );
        assert!(!state.store.path().exists());
    }

    #[tokio::test]
    async fn test_upload_broken_document_is_server_error() {
        let (app, _state, _dir) = setup_test_app();

        let response = app
            .oneshot(upload_request("01.09.2024.docx", b"not a document"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert!(json["error"].as_str().unwrap().contains("Invalid document package"));
    }

    #[tokio::test]
    async fn test_upload_oversized_part_is_server_error() {
        let (app, state, _dir) = setup_test_app();
        let doc = declare_part_size(
            docx_with_table(&[&["101"]]),
            "word/document.xml",
            u32::MAX - 1,
        );

        let response = app
            .oneshot(upload_request("01.09.2024 schedule.docx", &doc))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await["error"],
            "Part 'word/document.xml' is too large"
        );
        assert!(!state.store.path().exists());
    }

    #[tokio::test]
    async fn test_upload_filename_without_date() {
        let (app, _state, _dir) = setup_test_app();
        let doc = docx_with_table(&[&["101"]]);

        let response = app
            .clone()
            .oneshot(upload_request(".docx", &doc))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await["error"],
            "time data '.docx' does not match format '%d.%m.%Y'"
        );

        let response = app
            .clone()
            .oneshot(upload_request("   .docx", &doc))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = app.oneshot(upload_request("", &doc)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_schedule_missing_group() {
        let (app, _state, _dir) = setup_test_app_with_data();

        let response = app
            .oneshot(json_request("/schedule", serde_json::json!({ "shift": 1 })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["detail"], "нет такой группы");
    }

    #[tokio::test]
    async fn test_schedule_missing_shift() {
        let (app, _state, _dir) = setup_test_app_with_data();

        for body in [
            serde_json::json!({ "group": "Группа А" }),
            serde_json::json!({ "group": "Группа А", "shift": 0 }),
            serde_json::json!({ "group": "Группа А", "shift": null }),
        ] {
            let response = app
                .clone()
                .oneshot(json_request("/schedule", body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(json_body(response).await["detail"], "не указана смена");
        }
    }

    #[tokio::test]
    async fn test_schedule_not_found() {
        let (app, _state, _dir) = setup_test_app_with_data();

        let response = app
            .oneshot(json_request(
                "/schedule",
                serde_json::json!({ "group": "ИС-99", "shift": 2 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await["detail"],
            "урок для данной группы не найден"
        );
    }

    #[tokio::test]
    async fn test_schedule_unrecognized_shift_uses_sentinel() {
        let (app, _state, _dir) = setup_test_app_with_data();

        let response = app
            .oneshot(json_request(
                "/schedule",
                serde_json::json!({ "group": "Группа Б", "shift": 3 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json[0]["time"], "not found");
        assert_eq!(json[0]["teacher"], "Петров");
    }

    #[tokio::test]
    async fn test_schedule_ids_never_repeat() {
        let (app, _state, _dir) = setup_test_app_with_data();
        let body = serde_json::json!({ "group": "Группа", "shift": 1 });

        let first = json_body(
            app.clone()
                .oneshot(json_request("/schedule", body.clone()))
                .await
                .unwrap(),
        )
        .await;
        let second = json_body(
            app.oneshot(json_request("/schedule", body)).await.unwrap(),
        )
        .await;

        let ids: Vec<u64> = first
            .as_array()
            .unwrap()
            .iter()
            .chain(second.as_array().unwrap())
            .map(|l| l["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_alice_schedule_text() {
        let (app, _state, _dir) = setup_test_app_with_data();

        let response = app
            .oneshot(json_request(
                "/alice_schedule",
                serde_json::json!({ "group": "Группа А", "shift": 2 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await["text"],
            "Расписание:\nГруппа Группа А, Кабинет 101, Преподаватель Иванов, Время 14:25 - 15:45, 2 пара\n"
        );
    }

    #[tokio::test]
    async fn test_alice_schedule_not_found_is_ok() {
        let (app, _state, _dir) = setup_test_app();

        let response = app
            .oneshot(json_request(
                "/alice_schedule",
                serde_json::json!({ "group": "ИС-99", "shift": 1 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await["text"],
            "Уроки для указанной группы не найдены."
        );
    }

    #[tokio::test]
    async fn test_alice_schedule_validation() {
        let (app, _state, _dir) = setup_test_app_with_data();

        let response = app
            .clone()
            .oneshot(json_request(
                "/alice_schedule",
                serde_json::json!({ "group": "", "shift": 1 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["detail"],
            "Вы не указали название группы."
        );

        let response = app
            .clone()
            .oneshot(json_request(
                "/alice_schedule",
                serde_json::json!({ "group": "Группа А", "shift": 0 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["detail"],
            "Вы не указали номер смены."
        );

        let response = app
            .oneshot(json_request(
                "/alice_schedule",
                serde_json::json!({ "group": "Группа А" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_alice_schedule_accepts_numeric_strings_and_floats() {
        let (app, _state, _dir) = setup_test_app_with_data();

        for shift in [serde_json::json!("2"), serde_json::json!(2.0)] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "/alice_schedule",
                    serde_json::json!({ "group": "Группа А", "shift": shift }),
                ))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                json_body(response).await["text"],
                "Расписание:\nГруппа Группа А, Кабинет 101, Преподаватель Иванов, Время 14:25 - 15:45, 2 пара\n"
            );
        }

        let response = app
            .oneshot(json_request(
                "/alice_schedule",
                serde_json::json!({ "group": "Группа А", "shift": "второй" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_lookups_wait_for_a_save_without_stalling_the_runtime() {
        let (app, state, _dir) = setup_test_app_with_data();
        let save = state.store.hold_for_save();

        let lookup = tokio::spawn(app.clone().oneshot(json_request(
            "/schedule",
            serde_json::json!({ "group": "Группа А", "shift": 1 }),
        )));
        let spoken = tokio::spawn(app.oneshot(json_request(
            "/alice_schedule",
            serde_json::json!({ "group": "Группа А", "shift": 1 }),
        )));

        // Single-threaded runtime: this only wakes if the lookups parked elsewhere.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!lookup.is_finished());
        assert!(!spoken.is_finished());

        drop(save);
        assert_eq!(lookup.await.unwrap().unwrap().status(), StatusCode::OK);
        assert_eq!(spoken.await.unwrap().unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin_with_credentials() {
        let (app, _state, _dir) = setup_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/schedule")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn test_cors_ignores_other_origins() {
        let (app, _state, _dir) = setup_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/schedule")
                    .header(header::ORIGIN, "http://evil.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }
}
