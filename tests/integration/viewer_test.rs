//! Integration tests for hosted AR viewer pages.

mod helpers;

use axum::http::{StatusCode, header};
use serde_json::json;

use helpers::TestApp;

const PUBLIC_URL: &str = "https://ar.example.com";

async fn app_with_public_url() -> TestApp {
    TestApp::with_config(|c| c.viewer.public_base_url = Some(PUBLIC_URL.to_string())).await
}

#[tokio::test]
async fn test_viewer_for_converted_model() {
    let app = app_with_public_url().await;
    app.mock_upstream(200, b"USDZ").await;
    assert_eq!(app.upload("robot.glb", b"glTF").await.status, StatusCode::OK);

    let response = app
        .post_json(
            "/api/viewer",
            &json!({
                "src": "https://cdn.example.com/robot.glb",
                "iosSrc": "/download/robot.usdz"
            }),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    let hosted_url = body["hostedUrl"].as_str().unwrap();
    assert!(hosted_url.starts_with("https://ar.example.com/viewer/model-"));
    assert!(hosted_url.ends_with(".html"));
    assert!(
        body["qrCode"]
            .as_str()
            .is_some_and(|qr| qr.starts_with("data:image/png;base64,") && qr.len() > 100)
    );

    let page = app.get(hosted_url.strip_prefix(PUBLIC_URL).unwrap()).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(
        page.header(header::CONTENT_TYPE)
            .is_some_and(|ct| ct.starts_with("text/html"))
    );
    let html = page.text();
    assert!(html.contains(r#"src="https://cdn.example.com/robot.glb""#));
    assert!(html.contains(r#"ios-src="https://ar.example.com/download/robot.usdz""#));
    assert!(html.contains("<model-viewer"));

    // The USDZ the page points at is served by the download route
    let usdz = app.get("/download/robot.usdz").await;
    assert_eq!(usdz.body.as_ref(), b"USDZ");
}

#[tokio::test]
async fn test_viewer_without_ios_source() {
    let app = app_with_public_url().await;

    let response = app
        .post_json("/api/viewer", &json!({ "src": "/download/chair.glb" }), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let hosted_url = response.json()["hostedUrl"].as_str().unwrap().to_string();
    let html = app
        .get(hosted_url.strip_prefix(PUBLIC_URL).unwrap())
        .await
        .text();
    assert!(html.contains(r#"src="https://ar.example.com/download/chair.glb""#));
    assert!(!html.contains("ios-src"));
}

#[tokio::test]
async fn test_viewer_uses_host_header_without_public_url() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/api/viewer",
            &json!({ "src": "/download/robot.usdz" }),
            Some("gateway.local:5000"),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response.json()["hostedUrl"]
            .as_str()
            .is_some_and(|url| url.starts_with("http://gateway.local:5000/viewer/"))
    );
}

#[tokio::test]
async fn test_viewer_rejects_bad_sources() {
    let app = app_with_public_url().await;

    let response = app
        .post_json("/api/viewer", &json!({ "src": "" }), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "VALIDATION_ERROR");

    let response = app
        .post_json("/api/viewer", &json!({ "src": "javascript:alert(1)" }), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post_json(
            "/api/viewer",
            &json!({ "src": "/download/a.glb", "iosSrc": "data:text/html,x" }),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.post_json("/api/viewer", &json!({}), None).await;
    assert!(response.status.is_client_error());

    let pages = std::fs::read_dir(app.state.store.viewers_dir()).unwrap();
    assert_eq!(pages.count(), 0);
}

#[tokio::test]
async fn test_unknown_viewer_page() {
    let app = TestApp::new().await;

    assert_eq!(
        app.get("/viewer/model-missing.html").await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/viewer/..%2Fconverted%2Frobot.usdz").await.status,
        StatusCode::BAD_REQUEST
    );
}
