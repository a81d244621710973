//! HTTP client for the remote conversion service.

use std::path::Path;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use tokio_util::io::ReaderStream;
use tracing::debug;

use convgate_core::config::UpstreamConfig;
use convgate_storage::naming::base_name;

use crate::error::ConversionError;

/// Thin wrapper over `reqwest::Client` that knows how to build a
/// conversion request.
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    endpoint: Url,
    token: String,
    from_format: String,
    to_format: String,
    timeout_seconds: u64,
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("from_format", &self.from_format)
            .field("to_format", &self.to_format)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish_non_exhaustive()
    }
}

impl UpstreamClient {
    /// Build a client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ConversionError> {
        let endpoint =
            Url::parse(&config.endpoint).map_err(|e| ConversionError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                reason: e.to_string(),
            })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(concat!("convgate/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            token: config.token.clone(),
            from_format: config.from_format.clone(),
            to_format: config.to_format.clone(),
            timeout_seconds: config.timeout_seconds,
        })
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// POST the spooled file to the conversion endpoint.
    ///
    /// Any HTTP status is returned as `Ok`; only transport failures are
    /// errors. The file is streamed, not buffered.
    pub async fn send(
        &self,
        spool_path: &Path,
        original_name: &str,
    ) -> Result<Response, ConversionError> {
        let file = tokio::fs::File::open(spool_path).await?;
        let length = file.metadata().await?.len();

        let part = Part::stream_with_length(
            reqwest::Body::wrap_stream(ReaderStream::new(file)),
            length,
        )
        .file_name(self.upload_file_name(original_name))
        .mime_str("application/octet-stream")?;

        let form = Form::new()
            .part("file", part)
            .text("from_format", self.from_format.clone())
            .text("to_format", self.to_format.clone());

        debug!(
            endpoint = %self.endpoint,
            bytes = length,
            from = %self.from_format,
            to = %self.to_format,
            "Sending conversion request"
        );

        self.http
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                ConversionError::from_transport(e, self.endpoint.as_str(), self.timeout_seconds)
            })
    }

    /// Filename announced in the multipart part: the client's base name,
    /// or a placeholder carrying the source extension.
    fn upload_file_name(&self, original_name: &str) -> String {
        let base = base_name(original_name);
        if base.is_empty() {
            format!("upload.{}", self.from_format)
        } else {
            base.to_string()
        }
    }
}
