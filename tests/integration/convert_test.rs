//! Integration tests for the upload form and conversion endpoint.

mod helpers;

use std::time::Duration;

use axum::http::{StatusCode, header};
use wiremock::matchers::{body_string_contains, header as header_matcher, method, path};
use wiremock::{Mock, ResponseTemplate};

use helpers::{TestApp, UPSTREAM_PATH, multipart_body, percent_encode};

#[tokio::test]
async fn test_index_serves_upload_form() {
    let app = TestApp::new().await;

    let response = app.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .header(header::CONTENT_TYPE)
            .is_some_and(|ct| ct.starts_with("text/html"))
    );
    let html = response.text();
    assert!(html.contains(r#"enctype="multipart/form-data""#));
    assert!(html.contains(r#"name="file""#));
    assert!(html.contains("Convert to USDZ"));
}

#[tokio::test]
async fn test_convert_success_returns_download_link() {
    let app = TestApp::new().await;
    Mock::given(method("POST"))
        .and(path(UPSTREAM_PATH))
        .and(header_matcher("authorization", "Token test-token"))
        .and(body_string_contains("name=\"from_format\""))
        .and(body_string_contains("glb"))
        .and(body_string_contains("name=\"to_format\""))
        .and(body_string_contains("usdz"))
        .and(body_string_contains("glTF-model-bytes"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"USDZDATA".to_vec()))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app.upload("model.glb", b"glTF-model-bytes").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.text(),
        r#"<a href="/download/model.usdz">Download USDZ</a>"#
    );
    assert!(app.uploads_empty());

    let download = app.get("/download/model.usdz").await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(download.body.as_ref(), b"USDZDATA");
}

#[tokio::test]
async fn test_convert_upstream_failure_returns_status_text() {
    let app = TestApp::with_config(|c| c.upstream.max_retries = 0).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app.upload("model.glb", b"glTF").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .header(header::CONTENT_TYPE)
            .is_some_and(|ct| ct.starts_with("text/plain"))
    );
    assert_eq!(response.text(), "Conversion failed with status code: 503");
    assert!(!app.converted_path("model.usdz").exists());
    assert!(app.uploads_empty());
}

#[tokio::test]
async fn test_convert_retries_transient_status() {
    let app = TestApp::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&app.upstream)
        .await;
    app.mock_upstream(200, b"USDZ-AFTER-RETRY").await;

    let response = app.upload("robot.glb", b"glTF").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("/download/robot.usdz"));
    assert_eq!(
        std::fs::read(app.converted_path("robot.usdz")).unwrap(),
        b"USDZ-AFTER-RETRY"
    );
}

#[tokio::test]
async fn test_convert_non_retryable_status_is_not_retried() {
    let app = TestApp::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app.upload("model.glb", b"glTF").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "Conversion failed with status code: 400");
}

#[tokio::test]
async fn test_convert_sanitizes_output_name() {
    let app = TestApp::new().await;
    app.mock_upstream(200, b"USDZ").await;

    let response = app.upload("../../my robot.glb", b"glTF").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains(r#"href="/download/my_robot.usdz""#));
    assert!(app.converted_path("my_robot.usdz").exists());
}

#[tokio::test]
async fn test_convert_long_multibyte_name_is_downloadable() {
    let app = TestApp::new().await;
    app.mock_upstream(200, b"USDZ-ACCENTED").await;

    for repeat in [100, 110, 130] {
        let response = app
            .upload(&("é".repeat(repeat) + ".glb"), b"glTF")
            .await;
        assert_eq!(response.status, StatusCode::OK, "{repeat}: {}", response.text());
    }

    // Every upload above shares the 200 byte stem
    let name = "é".repeat(100) + ".usdz";
    assert!(app.converted_path(&name).exists());

    let download = app.get(&format!("/download/{}", percent_encode(&name))).await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(download.body.as_ref(), b"USDZ-ACCENTED");
    assert!(app.uploads_empty());
}

#[tokio::test]
async fn test_convert_long_cjk_name_is_downloadable() {
    let app = TestApp::new().await;
    app.mock_upstream(200, b"USDZ").await;

    let response = app.upload(&("三维模型".repeat(60) + ".glb"), b"glTF").await;

    assert_eq!(response.status, StatusCode::OK);
    let name = "三维模型".repeat(60).chars().take(66).collect::<String>() + ".usdz";
    assert!(response.text().contains(&format!("/download/{name}")));
    let download = app.get(&format!("/download/{}", percent_encode(&name))).await;
    assert_eq!(download.status, StatusCode::OK);
}

#[tokio::test]
async fn test_convert_missing_file_part() {
    let app = TestApp::new().await;
    app.expect_no_upstream_calls().await;

    let (content_type, body) = multipart_body("note", None, b"hello");
    let response = app.post_multipart(&content_type, body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "VALIDATION_ERROR");
    assert!(app.uploads_empty());
}

#[tokio::test]
async fn test_convert_empty_file_name() {
    let app = TestApp::new().await;
    app.expect_no_upstream_calls().await;

    let response = app.upload("", b"glTF").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.uploads_empty());
}

#[tokio::test]
async fn test_convert_rejects_oversized_upload() {
    let app = TestApp::with_config(|c| c.storage.max_upload_size_bytes = Some(16)).await;
    app.expect_no_upstream_calls().await;

    let response = app.upload("model.glb", &[0u8; 1024]).await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.uploads_empty());
}

#[tokio::test]
async fn test_convert_rejects_disallowed_extension() {
    let app = TestApp::with_config(|c| {
        c.storage.allowed_extensions = vec!["glb".to_string()];
    })
    .await;
    app.expect_no_upstream_calls().await;

    let response = app.upload("notes.txt", b"plain text").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["message"]
        .as_str()
        .is_some_and(|m| m.contains("txt")));
    assert!(app.uploads_empty());
}

#[tokio::test]
async fn test_convert_upstream_timeout() {
    let app = TestApp::with_config(|c| c.upstream.timeout_seconds = 1).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app.upload("model.glb", b"glTF").await;

    assert_eq!(response.status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(response.json()["error"], "UPSTREAM_TIMEOUT");
    assert!(!app.converted_path("model.usdz").exists());
    assert!(app.uploads_empty());
}

#[tokio::test]
async fn test_convert_overwrites_previous_output() {
    let app = TestApp::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"FIRST".to_vec()))
        .up_to_n_times(1)
        .mount(&app.upstream)
        .await;
    app.mock_upstream(200, b"SECOND").await;

    app.upload("model.glb", b"one").await;
    app.upload("model.glb", b"two").await;

    let download = app.get("/download/model.usdz").await;
    assert_eq!(download.body.as_ref(), b"SECOND");
}
