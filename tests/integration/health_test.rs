//! Integration tests for the health endpoints.

mod helpers;

use axum::http::StatusCode;

use helpers::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.get("/api/health").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert!(body["data"]["version"].is_string());
}

#[tokio::test]
async fn test_health_detailed_reports_conversions() {
    let app = TestApp::with_config(|c| c.upstream.max_retries = 0).await;
    app.mock_upstream(200, b"USDZ").await;

    app.upload("model.glb", b"glTF").await;

    let response = app.get("/api/health/detailed").await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.json()["data"];
    assert_eq!(data["status"], "ok");
    assert_eq!(data["storage"], "available");
    assert_eq!(data["converted_files"], 1);
    assert_eq!(data["conversions"]["conversions_started"], 1);
    assert_eq!(data["conversions"]["conversions_succeeded"], 1);
    assert_eq!(data["conversions"]["total_input_bytes"], 4);
    assert_eq!(data["conversions"]["total_output_bytes"], 4);
}

#[tokio::test]
async fn test_health_detailed_degraded_when_storage_missing() {
    let app = TestApp::new().await;
    std::fs::remove_dir_all(app.state.store.converted_dir()).unwrap();

    let response = app.get("/api/health/detailed").await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.json()["data"];
    assert_eq!(data["status"], "degraded");
    assert_eq!(data["storage"], "unavailable");
    assert_eq!(data["converted_files"], 0);
}
