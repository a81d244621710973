//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use convgate_api::{AppState, build_app};
use convgate_core::config::AppConfig;

/// Boundary used by [`multipart_body`].
const BOUNDARY: &str = "convgate-test-boundary";

/// Path the mocked conversion service listens on.
pub const UPSTREAM_PATH: &str = "/convert";

/// Token configured for the mocked conversion service.
pub const UPSTREAM_TOKEN: &str = "test-token";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state behind the router
    pub state: AppState,
    /// Mocked conversion service
    pub upstream: MockServer,
    /// Scratch data root, removed on drop
    _data_dir: TempDir,
}

impl TestApp {
    /// Create a new test application with default settings
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application, adjusting the config before the state is built
    pub async fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let upstream = MockServer::start().await;

        let mut config = AppConfig::default();
        config.storage.data_root = data_dir.path().to_string_lossy().into_owned();
        config.upstream.endpoint = format!("{}{}", upstream.uri(), UPSTREAM_PATH);
        config.upstream.token = UPSTREAM_TOKEN.to_string();
        config.upstream.retry_delay_ms = 5;
        tweak(&mut config);

        let state = AppState::new(config)
            .await
            .expect("Failed to build app state");
        let router = build_app(state.clone());

        Self {
            router,
            state,
            upstream,
            _data_dir: data_dir,
        }
    }

    /// Make the conversion service answer every request with `status` and `body`
    pub async fn mock_upstream(&self, status: u16, body: &[u8]) {
        Mock::given(method("POST"))
            .and(path(UPSTREAM_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_bytes(body.to_vec()))
            .mount(&self.upstream)
            .await;
    }

    /// Expect the conversion service never to be called
    pub async fn expect_no_upstream_calls(&self) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&self.upstream)
            .await;
    }

    /// POST a file to `/` as the upload form would
    pub async fn upload(&self, file_name: &str, contents: &[u8]) -> TestResponse {
        let (content_type, body) = multipart_body("file", Some(file_name), contents);
        self.post_multipart(&content_type, body).await
    }

    /// POST a raw multipart body to `/`
    pub async fn post_multipart(&self, content_type: &str, body: Vec<u8>) -> TestResponse {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// POST a JSON body, optionally with a `Host` header
    pub async fn post_json(&self, path: &str, body: &Value, host: Option<&str>) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(host) = host {
            builder = builder.header(header::HOST, host);
        }
        let req = builder
            .body(Body::from(body.to_string()))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// GET a path
    pub async fn get(&self, path: &str) -> TestResponse {
        let req = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Location a converted file is stored at
    pub fn converted_path(&self, name: &str) -> PathBuf {
        self.state.store.converted_dir().join(name)
    }

    /// Whether no upload spool is left on disk
    pub fn uploads_empty(&self) -> bool {
        std::fs::read_dir(self.state.store.uploads_dir())
            .expect("Failed to read uploads dir")
            .next()
            .is_none()
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub body: Bytes,
}

impl TestResponse {
    /// Body as UTF-8 text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON, `Null` if it is not JSON
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    /// A header value as a string
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Percent-encode a path segment, leaving unreserved ASCII as is.
pub fn percent_encode(segment: &str) -> String {
    segment
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
                (b as char).to_string()
            } else {
                format!("%{b:02X}")
            }
        })
        .collect()
}

/// Build a `multipart/form-data` body with a single part.
///
/// Returns the `Content-Type` header value and the encoded body.
pub fn multipart_body(field: &str, file_name: Option<&str>, contents: &[u8]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    match file_name {
        Some(name) => body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        ),
        None => body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n").as_bytes(),
        ),
    }
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
