//! Integration tests for converted file downloads.

mod helpers;

use axum::http::{StatusCode, header};

use helpers::TestApp;

#[tokio::test]
async fn test_download_existing_file_as_attachment() {
    let app = TestApp::new().await;
    std::fs::write(app.converted_path("chair.usdz"), b"PK-usdz-payload").unwrap();

    let response = app.get("/download/chair.usdz").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_ref(), b"PK-usdz-payload");
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        Some(r#"attachment; filename="chair.usdz""#)
    );
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        Some("model/vnd.usdz+zip")
    );
    assert_eq!(response.header(header::CONTENT_LENGTH), Some("15"));
}

#[tokio::test]
async fn test_download_missing_file() {
    let app = TestApp::new().await;

    let response = app.get("/download/nothing.usdz").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_download_rejects_traversal() {
    let app = TestApp::new().await;
    std::fs::write(
        app.state.store.uploads_dir().join("secret.upload"),
        b"private",
    )
    .unwrap();

    let response = app.get("/download/..%2Fuploads%2Fsecret.upload").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_download_rejects_hidden_files() {
    let app = TestApp::new().await;
    std::fs::write(app.converted_path(".model.usdz.part"), b"partial").unwrap();

    let response = app.get("/download/.model.usdz.part").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_nested_path_is_not_routed() {
    let app = TestApp::new().await;

    let response = app.get("/download/a/b.usdz").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
