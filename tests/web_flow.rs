//! End-to-end page flow tests against a stubbed backend API.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_test::TestServer;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use therapyconnect::backend::BackendClient;
use therapyconnect::config::{AuthConfig, UploadConfig};
use therapyconnect::flow::InFlightCancels;
use therapyconnect::render::TemplateEngine;
use therapyconnect::web::{create_router, AppState};

const PATIENT_TOKEN: &str = "tok-patient";
const PATIENT_ID: &str = "p_000001";
const THERAPIST_ID: &str = "t_000001";

#[derive(Default)]
struct StubState {
    fail_sessions: AtomicBool,
    fail_payments: AtomicBool,
    bookings: AtomicUsize,
    cancellations: AtomicUsize,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", PATIENT_TOKEN))
        .unwrap_or(false)
}

fn session_json() -> serde_json::Value {
    json!({
        "id": "SES_1",
        "therapist_id": THERAPIST_ID,
        "therapist_first_name": "Alice",
        "therapist_last_name": "Smith",
        "patient_id": PATIENT_ID,
        "patient_first_name": "John",
        "patient_last_name": "Doe",
        "scheduled_start_datetime": (chrono::Utc::now() + chrono::Duration::days(7)).to_rfc3339(),
        "duration": 60,
        "fee": 75.0,
        "status": "scheduled"
    })
}

fn therapist_json() -> serde_json::Value {
    json!({
        "id": THERAPIST_ID,
        "first_name": "Alice",
        "last_name": "Smith",
        "area_of_expertise": "Cognitive Behavioral Therapy",
        "average_score": 8.5
    })
}

fn stub_router(stub: Arc<StubState>) -> Router {
    Router::new()
        .route(
            "/auth/profile/",
            get(|headers: HeaderMap| async move {
                if authorized(&headers) {
                    Json(json!({"username": "John Doe", "email": "john@example.com"}))
                        .into_response()
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"detail": "Invalid token"})),
                    )
                        .into_response()
                }
            }),
        )
        .route(
            "/auth/login/",
            post(|Json(body): Json<serde_json::Value>| async move {
                if body["password"] == "secret123" {
                    Json(json!({
                        "access": PATIENT_TOKEN,
                        "refresh": "refresh",
                        "user": {"id": PATIENT_ID, "first_name": "John", "last_name": "Doe"}
                    }))
                    .into_response()
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"error": "Invalid credentials"})),
                    )
                        .into_response()
                }
            }),
        )
        .route(
            "/sessions/",
            get({
                let stub = stub.clone();
                move |_headers: HeaderMap| async move {
                    if stub.fail_sessions.load(Ordering::SeqCst) {
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({"error": "sessions store offline"})),
                        )
                            .into_response()
                    } else {
                        Json(json!([session_json()])).into_response()
                    }
                }
            })
            .post({
                let stub = stub.clone();
                move |Json(_body): Json<serde_json::Value>| async move {
                    stub.bookings.fetch_add(1, Ordering::SeqCst);
                    Json(session_json()).into_response()
                }
            }),
        )
        .route(
            "/sessions/{id}/",
            get(|Path(_id): Path<String>| async move { Json(session_json()) }),
        )
        .route(
            "/sessions/{id}/cancel_session/",
            post({
                let stub = stub.clone();
                move |Path(_id): Path<String>, Json(_body): Json<serde_json::Value>| async move {
                    stub.cancellations.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"refund_processed": true}))
                }
            }),
        )
        .route(
            "/payments/",
            get({
                let stub = stub.clone();
                move || async move {
                    if stub.fail_payments.load(Ordering::SeqCst) {
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({"error": "payments store offline"})),
                        )
                            .into_response()
                    } else {
                        Json(json!([])).into_response()
                    }
                }
            }),
        )
        .route(
            "/therapists/",
            get(|| async { Json(json!([therapist_json()])) }),
        )
        .route(
            "/therapists/{id}",
            get(|Path(_id): Path<String>| async move { Json(therapist_json()) }),
        )
        .route("/reviews/", get(|| async { Json(json!([])) }))
        .route(
            "/therapists/{id}/patients/",
            get(|Path(_id): Path<String>| async move { Json(json!([])) }),
        )
        .route(
            "/therapists/{id}/calendar_sessions/",
            get(|Path(_id): Path<String>| async move {
                // one entry under an unpadded key, one outside the month
                Json(json!({
                    "year": 2026,
                    "month": 9,
                    "sessions": {
                        "2026-9-5": [{
                            "id": "SES_5", "patient_name": "Megan Fields",
                            "patient_id": "p_000002", "start_time": "09:00",
                            "duration": 60, "status": "scheduled", "fee": 75.0
                        }],
                        "2026-10-01": [{
                            "id": "SES_6", "patient_name": "Stray Entry",
                            "patient_id": "p_000003", "start_time": "10:00",
                            "duration": 60, "status": "scheduled", "fee": 75.0
                        }]
                    }
                }))
            }),
        )
        .route(
            "/availabilities/",
            get(|| async {
                Json(json!([
                    {"id": "AVAIL_1", "therapist_id": THERAPIST_ID, "date": "2026-09-10",
                     "time_slot": "9-10", "session_id": null},
                    {"id": "AVAIL_2", "therapist_id": THERAPIST_ID, "date": "2026-09-10",
                     "time_slot": "10-11", "session_id": "SES_9"}
                ]))
            }),
        )
        .route(
            "/availabilities/{id}/",
            get(|Path(id): Path<String>, Query(_q): Query<HashMap<String, String>>| async move {
                let session_id = if id == "AVAIL_2" {
                    Some("SES_9".to_string())
                } else {
                    None
                };
                Json(json!({
                    "id": id,
                    "therapist_id": THERAPIST_ID,
                    "date": "2026-09-10",
                    "time_slot": "9-10",
                    "session_id": session_id
                }))
            }),
        )
}

async fn start_app(stub: Arc<StubState>) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, stub_router(stub))
            .await
            .expect("stub backend");
    });

    let state = AppState {
        backend: BackendClient::new(&format!("http://{}", addr)),
        templates: Arc::new(TemplateEngine::new().expect("templates")),
        auth_config: Arc::new(AuthConfig::default()),
        upload_config: Arc::new(UploadConfig::default()),
        cancels: InFlightCancels::new(),
    };
    TestServer::new(create_router(state)).expect("test server")
}

fn patient_cookies() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("cookie"),
        HeaderValue::from_str(&format!(
            "tc_access={}; tc_uid={}; tc_role=patient",
            PATIENT_TOKEN, PATIENT_ID
        ))
        .expect("cookie header"),
    )
}

fn therapist_cookies() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("cookie"),
        HeaderValue::from_str(&format!(
            "tc_access={}; tc_uid={}; tc_role=therapist",
            PATIENT_TOKEN, THERAPIST_ID
        ))
        .expect("cookie header"),
    )
}

#[tokio::test]
async fn anonymous_home_shows_login_link() {
    let server = start_app(Arc::new(StubState::default())).await;
    let response = server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.text();
    assert!(body.contains("Log in"));
    assert!(!body.contains("/dashboard/"));
}

#[tokio::test]
async fn login_sets_credentials_and_redirects() {
    let server = start_app(Arc::new(StubState::default())).await;
    let response = server
        .post("/auth/login")
        .form(&json!({"email": "john@example.com", "password": "secret123"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/dashboard/patient");

    let cookies: Vec<String> = response
        .iter_headers_by_name("set-cookie")
        .map(|v| v.to_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(cookies.len(), 4);
    assert!(cookies.iter().any(|c| c.starts_with("tc_access=tok-patient") && c.contains("HttpOnly")));
    assert!(cookies.iter().any(|c| c.starts_with("tc_role=patient")));
    assert!(cookies.iter().all(|c| c.contains("Max-Age=604800")));
}

#[tokio::test]
async fn failed_login_rerenders_with_backend_message() {
    let server = start_app(Arc::new(StubState::default())).await;
    let response = server
        .post("/auth/login")
        .form(&json!({"email": "john@example.com", "password": "wrong"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().contains("Invalid credentials"));
}

#[tokio::test]
async fn dashboard_requires_login() {
    let server = start_app(Arc::new(StubState::default())).await;
    let response = server.get("/dashboard/patient").await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/auth");
}

#[tokio::test]
async fn patient_dashboard_renders_sessions() {
    let server = start_app(Arc::new(StubState::default())).await;
    let (name, value) = patient_cookies();
    let response = server
        .get("/dashboard/patient")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.text();
    assert!(body.contains("John Doe"));
    assert!(body.contains("Alice Smith"));
}

#[tokio::test]
async fn payments_failure_degrades_quietly() {
    let stub = Arc::new(StubState::default());
    stub.fail_payments.store(true, Ordering::SeqCst);
    let server = start_app(stub).await;

    let (name, value) = patient_cookies();
    let response = server
        .get("/dashboard/patient")
        .add_header(name, value)
        .await;

    // page still renders, payments section is just empty
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("No payments to show"));
}

#[tokio::test]
async fn sessions_failure_shows_error_page() {
    let stub = Arc::new(StubState::default());
    stub.fail_sessions.store(true, Ordering::SeqCst);
    let server = start_app(stub).await;

    let (name, value) = patient_cookies();
    let response = server
        .get("/dashboard/patient")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().contains("sessions store offline"));
}

#[tokio::test]
async fn therapist_calendar_normalizes_feed_dates() {
    let server = start_app(Arc::new(StubState::default())).await;
    let (name, value) = therapist_cookies();

    // month=8 is the zero-based index for September
    let response = server
        .get("/dashboard/therapist")
        .add_query_param("year", "2026")
        .add_query_param("month", "8")
        .add_query_param("day", "2026-09-05")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.text();
    // the unpadded "2026-9-5" feed key lands under the zero-padded day
    assert!(body.contains("Megan Fields"));
    // the October entry never reaches the September view
    assert!(!body.contains("Stray Entry"));
}

#[tokio::test]
async fn therapist_directory_is_public() {
    let server = start_app(Arc::new(StubState::default())).await;
    let response = server.get("/therapists").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("Alice Smith"));

    let detail = server.get("/therapists/t_000001").await;
    assert_eq!(detail.status_code(), StatusCode::OK);
    let body = detail.text();
    assert!(body.contains("Cognitive Behavioral Therapy"));
    // anonymous visitors see slots but no booking button
    assert!(!body.contains("/book?availability_id="));
}

#[tokio::test]
async fn booking_open_slot_confirms_and_books_once() {
    let stub = Arc::new(StubState::default());
    let server = start_app(stub.clone()).await;
    let (name, value) = patient_cookies();

    let confirm = server
        .get("/therapists/t_000001/book")
        .add_query_param("availability_id", "AVAIL_1")
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(confirm.status_code(), StatusCode::OK);
    assert!(confirm.text().contains("Confirm your booking"));

    let booked = server
        .post("/therapists/t_000001/book")
        .form(&json!({"availability_id": "AVAIL_1"}))
        .add_header(name, value)
        .await;
    assert_eq!(booked.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(booked.header("location"), "/dashboard/patient");
    assert_eq!(stub.bookings.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn booking_taken_slot_redirects_back() {
    let stub = Arc::new(StubState::default());
    let server = start_app(stub.clone()).await;
    let (name, value) = patient_cookies();

    let confirm = server
        .get("/therapists/t_000001/book")
        .add_query_param("availability_id", "AVAIL_2")
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(confirm.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(confirm.header("location"), "/therapists/t_000001?taken=1");

    let submit = server
        .post("/therapists/t_000001/book")
        .form(&json!({"availability_id": "AVAIL_2"}))
        .add_header(name, value)
        .await;
    assert_eq!(submit.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(stub.bookings.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancel_flow_reports_refund() {
    let stub = Arc::new(StubState::default());
    let server = start_app(stub.clone()).await;
    let (name, value) = patient_cookies();

    let form = server
        .get("/sessions/SES_1/cancel")
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(form.status_code(), StatusCode::OK);
    assert!(form.text().contains("Cancel this session?"));

    let result = server
        .post("/sessions/SES_1/cancel")
        .form(&json!({"reason": "Schedule conflict"}))
        .add_header(name, value)
        .await;
    assert_eq!(result.status_code(), StatusCode::OK);
    assert!(result.text().contains("refund has been processed"));
    assert_eq!(stub.cancellations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancel_rejects_overlong_reason() {
    let stub = Arc::new(StubState::default());
    let server = start_app(stub.clone()).await;
    let (name, value) = patient_cookies();

    let result = server
        .post("/sessions/SES_1/cancel")
        .form(&json!({"reason": "x".repeat(501)}))
        .add_header(name, value)
        .await;
    assert_eq!(result.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(stub.cancellations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn logout_clears_credentials() {
    let server = start_app(Arc::new(StubState::default())).await;
    let (name, value) = patient_cookies();
    let response = server.post("/auth/logout").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/");
    let cookies: Vec<String> = response
        .iter_headers_by_name("set-cookie")
        .map(|v| v.to_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(cookies.len(), 4);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
}
