//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use convgate_converter::{ConversionMetrics, ConversionProcessor};
use convgate_core::config::AppConfig;
use convgate_core::result::AppResult;
use convgate_storage::LocalStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Spool and converted-file storage
    pub store: LocalStore,
    /// Conversion pipeline
    pub processor: ConversionProcessor,
    /// Conversion counters, shared with the processor
    pub metrics: Arc<ConversionMetrics>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Build the state: create storage directories and the upstream client.
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let store = LocalStore::new(&config.storage).await?;
        let processor = ConversionProcessor::new(&config, store.clone())?;
        let metrics = processor.metrics();

        Ok(Self {
            config: Arc::new(config),
            store,
            processor,
            metrics,
            started_at: Instant::now(),
        })
    }

    /// Seconds since the state was built.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
