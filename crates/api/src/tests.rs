//! Router tests over an in-memory record store.

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use feedesk_core::payments::PaymentRecord;
use feedesk_core::storage::{MemoryRecordStore, StoreHandle};
use feedesk_core::view::{PublishedView, ViewCoordinator, ViewHandle, ViewSettings, ViewState};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::{AppState, create_router};

fn example_records() -> Vec<PaymentRecord> {
    vec![
        PaymentRecord::new("P1", "E1", "Tuition Fee", dec!(500), "Paid")
            .with_entity_name("Ama")
            .with_department("Nursing"),
        PaymentRecord::new("P2", "E1", "Hostel", dec!(100), "Paid").with_entity_name("Ama"),
        PaymentRecord::new("P3", "E2", "Tuition", dec!(300), "Pending").with_entity_name("Kofi"),
    ]
}

async fn wait_until(handle: &ViewHandle, predicate: impl Fn(&PublishedView) -> bool) {
    let mut changes = handle.changes();
    tokio::time::timeout(Duration::from_secs(5), changes.wait_for(|view| predicate(view)))
        .await
        .expect("timed out waiting for publication")
        .expect("coordinator dropped its publisher");
}

fn app_with(store: StoreHandle) -> (Router, ViewHandle) {
    let (handle, _task) = ViewCoordinator::spawn(store, &ViewSettings::default());
    (create_router(AppState::new(handle.clone(), "GHS")), handle)
}

async fn loaded_app() -> (Router, ViewHandle) {
    let store = MemoryRecordStore::new(example_records());
    let (app, handle) = app_with(StoreHandle::new(store));
    wait_until(&handle, |view| {
        view.status.generation >= 1 && view.status.state == ViewState::Idle
    })
    .await;
    (app, handle)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn test_health_reports_loaded_view() {
    let (app, _handle) = loaded_app().await;

    let (status, body) = get(&app, "/api/v1/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store_ready"], true);
    assert_eq!(body["generation"], 1);
}

#[tokio::test]
async fn test_dashboard_renders_totals_as_strings() {
    let (app, _handle) = loaded_app().await;

    let (status, body) = get(&app, "/api/v1/dashboard").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currency"], "GHS");
    assert_eq!(body["kpis"]["total"], "600.00");
    assert_eq!(body["kpis"]["tuition_total"], "500.00");
    assert_eq!(body["kpis"]["other_total"], "100.00");
    assert_eq!(body["kpis"]["paid_count"], 2);
    assert_eq!(body["payments_shown"], 3);
    assert_eq!(body["students_shown"], 1);
    assert_eq!(body["students"][0]["student_id"], "E1");
    assert_eq!(body["students"][0]["total"], "600.00");
    assert_eq!(body["status"]["state"], "idle");
}

#[tokio::test]
async fn test_dashboard_query_filters_lists_but_not_kpis() {
    let (app, _handle) = loaded_app().await;

    let (_, body) = get(&app, "/api/v1/dashboard?q=HOSTEL").await;

    assert_eq!(body["search"], "hostel");
    assert_eq!(body["payments_shown"], 1);
    assert_eq!(body["total_payments"], 3);
    assert_eq!(body["kpis"]["total"], "600.00");
    assert_eq!(body["students"][0]["tuition"], "0.00");
    assert_eq!(body["students"][0]["other"], "100.00");
}

#[tokio::test]
async fn test_payments_and_students_lists() {
    let (app, _handle) = loaded_app().await;

    let (_, payments) = get(&app, "/api/v1/payments?q=kofi").await;
    assert_eq!(payments["payments_shown"], 1);
    assert_eq!(payments["payments"][0]["payment_id"], "P3");
    assert_eq!(payments["payments"][0]["paid"], false);

    let (_, students) = get(&app, "/api/v1/students?q=kofi").await;
    assert_eq!(students["students_shown"], 0);
    assert_eq!(students["students"], json!([]));

    let (_, everyone) = get(&app, "/api/v1/students").await;
    assert_eq!(everyone["students"][0]["department"], "Nursing");
}

#[tokio::test]
async fn test_student_history() {
    let (app, _handle) = loaded_app().await;

    let (status, body) = get(&app, "/api/v1/students/E1/history").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ama");
    assert_eq!(body["known"], true);
    assert_eq!(body["total"], "600.00");
    assert_eq!(
        body["breakdown"],
        json!([
            {"payment_type": "Tuition Fee", "amount": "500.00"},
            {"payment_type": "Hostel", "amount": "100.00"},
        ])
    );
    assert_eq!(body["payments"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_unknown_student_history_is_empty() {
    let (app, _handle) = loaded_app().await;

    let (status, body) = get(&app, "/api/v1/students/E404/history").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["known"], false);
    assert_eq!(body["name"], "E404");
    assert_eq!(body["total"], "0.00");
    assert_eq!(body["payments"], json!([]));
}

#[tokio::test]
async fn test_invalid_input_is_rejected() {
    let (app, _handle) = loaded_app().await;

    let (status, body) = get(&app, "/api/v1/students/%20/history").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let long = "x".repeat(super::routes::MAX_QUERY_CHARS + 1);
    let (status, body) = get(&app, &format!("/api/v1/payments?q={long}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_set_search_changes_active_view() {
    let (app, handle) = loaded_app().await;

    let request = Request::builder()
        .method("PUT")
        .uri("/api/v1/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"query":"Hostel"}"#))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["search"], "hostel");

    wait_until(&handle, |view| view.search.query() == "hostel").await;
    let (_, dashboard) = get(&app, "/api/v1/dashboard").await;
    assert_eq!(dashboard["search"], "hostel");
    assert_eq!(dashboard["payments_shown"], 1);
}

#[tokio::test]
async fn test_refresh_accepted_until_shutdown() {
    let (app, handle) = loaded_app().await;
    let refresh = || {
        Request::builder()
            .method("POST")
            .uri("/api/v1/refresh")
            .body(Body::empty())
            .unwrap()
    };

    let (status, body) = send(&app, refresh()).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["accepted"], true);

    handle.shutdown().await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), async {
        while handle.is_running() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("coordinator did not stop");

    let (status, body) = send(&app, refresh()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_uninitialized_store_serves_empty_degraded_view() {
    let (app, handle) = app_with(StoreHandle::Uninitialized);
    wait_until(&handle, |view| view.status.last_error.is_some()).await;

    let (_, health) = get(&app, "/api/v1/health").await;
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["store_ready"], false);

    let (status, dashboard) = get(&app, "/api/v1/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["kpis"]["total"], "0.00");
    assert_eq!(dashboard["payments"], json!([]));
    assert_eq!(
        dashboard["status"]["last_error"],
        "record store is not initialized"
    );
}
