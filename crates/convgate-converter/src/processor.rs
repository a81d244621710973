//! Conversion processor: forwards a spooled upload to the upstream with
//! retry, stores the result, and collects metrics.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::TryStreamExt;
use reqwest::Response;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use convgate_core::config::{AppConfig, StorageConfig, UpstreamConfig};
use convgate_core::error::{AppError, ErrorKind};
use convgate_storage::naming::{derive_output_name, extension_of};
use convgate_storage::{LocalStore, SpooledUpload};

use crate::client::UpstreamClient;
use crate::error::ConversionError;
use crate::metrics::ConversionMetrics;
use crate::models::{ConversionOutcome, ConvertedFile};

/// Status the upstream must return for a conversion to count as a success.
const SUCCESS_STATUS: u16 = 200;

/// The main conversion processor.
#[derive(Debug, Clone)]
pub struct ConversionProcessor {
    client: UpstreamClient,
    store: LocalStore,
    upstream: UpstreamConfig,
    storage: StorageConfig,
    metrics: Arc<ConversionMetrics>,
}

impl ConversionProcessor {
    /// Create a new processor over an existing store.
    pub fn new(config: &AppConfig, store: LocalStore) -> Result<Self, ConversionError> {
        Ok(Self {
            client: UpstreamClient::new(&config.upstream)?,
            store,
            upstream: config.upstream.clone(),
            storage: config.storage.clone(),
            metrics: Arc::new(ConversionMetrics::new()),
        })
    }

    /// Shared metrics collector.
    pub fn metrics(&self) -> Arc<ConversionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Store the processor writes converted files into.
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Convert one spooled upload.
    ///
    /// The spool is removed before this returns, whatever the outcome.
    #[instrument(
        skip(self, upload),
        fields(
            conversion_id = %Uuid::now_v7(),
            original = %upload.original_name(),
            bytes = upload.size()
        )
    )]
    pub async fn process(
        &self,
        upload: SpooledUpload,
    ) -> Result<ConversionOutcome, ConversionError> {
        let started = Instant::now();
        self.metrics.record_started(upload.size());

        let result = self.run_pipeline(&upload, started).await;

        // Spool cleanup failures are logged by `remove` and never mask the result
        let _ = upload.remove().await;

        match &result {
            Ok(ConversionOutcome::Converted(file)) => {
                self.metrics
                    .record_success(started.elapsed(), file.size_bytes);
                info!(
                    file_name = %file.file_name,
                    size = file.size_bytes,
                    attempts = file.attempts,
                    duration_ms = file.duration_ms,
                    "Conversion succeeded"
                );
            }
            Ok(ConversionOutcome::Failed { status, attempts }) => {
                self.metrics.record_rejected();
                warn!(status, attempts, "Conversion service rejected the file");
            }
            Err(ConversionError::UpstreamTimeout { timeout_seconds }) => {
                self.metrics.record_timeout();
                warn!(timeout_seconds, "Conversion service timed out");
            }
            Err(e) => {
                self.metrics.record_error();
                warn!(error = %e, "Conversion failed");
            }
        }

        result
    }

    async fn run_pipeline(
        &self,
        upload: &SpooledUpload,
        started: Instant,
    ) -> Result<ConversionOutcome, ConversionError> {
        let extension = extension_of(upload.original_name());
        if !self.storage.accepts_extension(extension.as_deref()) {
            return Err(ConversionError::UnsupportedExtension {
                extension: extension.unwrap_or_else(|| "(none)".to_string()),
            });
        }

        let (response, attempts) = self.send_with_retry(upload).await?;

        let status = response.status().as_u16();
        if status != SUCCESS_STATUS {
            return Ok(ConversionOutcome::Failed { status, attempts });
        }

        // The client timeout also bounds the body read
        let timeout_seconds = self.upstream.timeout_seconds;
        let endpoint = self.client.endpoint().as_str();
        let file_name = derive_output_name(upload.original_name(), &self.upstream.to_format);
        let body = Box::pin(response.bytes_stream().map_err(|e| {
            AppError::from(ConversionError::from_transport(e, endpoint, timeout_seconds))
        }));
        let size_bytes = self
            .store
            .write_converted(&file_name, body)
            .await
            .map_err(|e| match e.kind {
                ErrorKind::Timeout => ConversionError::UpstreamTimeout { timeout_seconds },
                _ => ConversionError::Storage(e),
            })?;

        Ok(ConversionOutcome::Converted(ConvertedFile {
            download_path: ConvertedFile::download_path_for(&file_name),
            file_name,
            size_bytes,
            source_bytes: upload.size(),
            attempts,
            duration_ms: started.elapsed().as_millis() as u64,
        }))
    }

    /// Send the upload, retrying transport failures and configured statuses.
    ///
    /// Returns the final response together with the number of attempts.
    /// Timeouts are not retried.
    async fn send_with_retry(
        &self,
        upload: &SpooledUpload,
    ) -> Result<(Response, u32), ConversionError> {
        let max_retries = self.upstream.max_retries;
        let mut attempt: u32 = 1;

        loop {
            match self
                .client
                .send(upload.path(), upload.original_name())
                .await
            {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let retry = status != SUCCESS_STATUS
                        && self.upstream.is_retryable_status(status)
                        && attempt <= max_retries;
                    if !retry {
                        return Ok((response, attempt));
                    }
                    warn!(attempt, status, "Conversion service returned retryable status");
                }
                Err(e) if e.is_retryable() && attempt <= max_retries => {
                    warn!(attempt, error = %e, "Conversion request failed");
                }
                Err(e) => return Err(e),
            }

            let delay: Duration = self.upstream.backoff_delay(attempt);
            self.metrics.record_retry();
            info!(
                attempt = attempt + 1,
                max = max_retries + 1,
                delay_ms = delay.as_millis() as u64,
                "Retrying conversion request"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
