//! Conversion metrics and telemetry.
//!
//! Tracks conversion counts, durations, and failure rates for observability.
//! Thread-safe via atomics for counters and a mutex for the duration samples.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Conversion metrics collector.
///
/// All operations are thread-safe and suitable for concurrent access
/// from multiple request handlers.
#[derive(Debug)]
pub struct ConversionMetrics {
    /// Total conversions started.
    pub conversions_started: AtomicU64,
    /// Conversions whose output was stored.
    pub conversions_succeeded: AtomicU64,
    /// Conversions the upstream answered with a non-success status.
    pub conversions_rejected: AtomicU64,
    /// Conversions aborted by a transport, validation or storage error.
    pub conversions_errored: AtomicU64,
    /// Conversions that hit the upstream timeout (also counted as errored).
    pub conversions_timed_out: AtomicU64,
    /// Extra upstream attempts made.
    pub upstream_retries: AtomicU64,
    /// Total bytes of output stored.
    pub total_output_bytes: AtomicU64,
    /// Total bytes of input forwarded.
    pub total_input_bytes: AtomicU64,
    /// Recent durations of successful conversions.
    duration_samples: Mutex<Vec<Duration>>,
}

/// Maximum number of duration samples to keep in memory.
const MAX_DURATION_SAMPLES: usize = 1000;

impl ConversionMetrics {
    /// Create a new empty metrics collector.
    pub fn new() -> Self {
        Self {
            conversions_started: AtomicU64::new(0),
            conversions_succeeded: AtomicU64::new(0),
            conversions_rejected: AtomicU64::new(0),
            conversions_errored: AtomicU64::new(0),
            conversions_timed_out: AtomicU64::new(0),
            upstream_retries: AtomicU64::new(0),
            total_output_bytes: AtomicU64::new(0),
            total_input_bytes: AtomicU64::new(0),
            duration_samples: Mutex::new(Vec::with_capacity(MAX_DURATION_SAMPLES)),
        }
    }

    /// Record a conversion start and the size of its input.
    pub fn record_started(&self, input_bytes: u64) {
        self.conversions_started.fetch_add(1, Ordering::Relaxed);
        self.total_input_bytes
            .fetch_add(input_bytes, Ordering::Relaxed);
    }

    /// Record a successful conversion with its duration and output size.
    pub fn record_success(&self, duration: Duration, output_bytes: u64) {
        self.conversions_succeeded.fetch_add(1, Ordering::Relaxed);
        self.total_output_bytes
            .fetch_add(output_bytes, Ordering::Relaxed);
        self.add_duration_sample(duration);
    }

    /// Record an upstream non-success response.
    pub fn record_rejected(&self) {
        self.conversions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a conversion aborted by an error.
    pub fn record_error(&self) {
        self.conversions_errored.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a timed-out conversion.
    pub fn record_timeout(&self) {
        self.conversions_timed_out.fetch_add(1, Ordering::Relaxed);
        self.conversions_errored.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one retry of the upstream call.
    pub fn record_retry(&self) {
        self.upstream_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Add a duration sample, evicting the oldest if at capacity.
    fn add_duration_sample(&self, duration: Duration) {
        if let Ok(mut samples) = self.duration_samples.lock() {
            if samples.len() >= MAX_DURATION_SAMPLES {
                samples.remove(0);
            }
            samples.push(duration);
        }
    }

    /// Get the current snapshot of metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let durations = self
            .duration_samples
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();

        let (p50, p95, p99) = Self::calculate_percentiles(&durations);

        MetricsSnapshot {
            conversions_started: self.conversions_started.load(Ordering::Relaxed),
            conversions_succeeded: self.conversions_succeeded.load(Ordering::Relaxed),
            conversions_rejected: self.conversions_rejected.load(Ordering::Relaxed),
            conversions_errored: self.conversions_errored.load(Ordering::Relaxed),
            conversions_timed_out: self.conversions_timed_out.load(Ordering::Relaxed),
            upstream_retries: self.upstream_retries.load(Ordering::Relaxed),
            total_output_bytes: self.total_output_bytes.load(Ordering::Relaxed),
            total_input_bytes: self.total_input_bytes.load(Ordering::Relaxed),
            duration_p50: p50,
            duration_p95: p95,
            duration_p99: p99,
            sample_count: durations.len() as u64,
        }
    }

    fn calculate_percentiles(
        durations: &[Duration],
    ) -> (Option<Duration>, Option<Duration>, Option<Duration>) {
        if durations.is_empty() {
            return (None, None, None);
        }

        let mut sorted = durations.to_vec();
        sorted.sort();
        let len = sorted.len();

        let p50 = sorted.get(len * 50 / 100).copied();
        let p95 = sorted.get(len * 95 / 100).copied();
        let p99 = sorted.get(len.saturating_sub(1) * 99 / 100).copied();

        (p50, p95, p99)
    }
}

impl Default for ConversionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of conversion metrics.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    pub conversions_started: u64,
    pub conversions_succeeded: u64,
    pub conversions_rejected: u64,
    pub conversions_errored: u64,
    pub conversions_timed_out: u64,
    pub upstream_retries: u64,
    pub total_output_bytes: u64,
    pub total_input_bytes: u64,
    /// P50 conversion duration, serialized as milliseconds.
    #[serde(
        serialize_with = "serialize_opt_duration",
        deserialize_with = "deserialize_opt_duration"
    )]
    pub duration_p50: Option<Duration>,
    /// P95 conversion duration, serialized as milliseconds.
    #[serde(
        serialize_with = "serialize_opt_duration",
        deserialize_with = "deserialize_opt_duration"
    )]
    pub duration_p95: Option<Duration>,
    /// P99 conversion duration, serialized as milliseconds.
    #[serde(
        serialize_with = "serialize_opt_duration",
        deserialize_with = "deserialize_opt_duration"
    )]
    pub duration_p99: Option<Duration>,
    /// Number of duration samples collected.
    pub sample_count: u64,
}

fn serialize_opt_duration<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match duration {
        Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
        None => serializer.serialize_none(),
    }
}

fn deserialize_opt_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let millis: Option<u64> = serde::Deserialize::deserialize(deserializer)?;
    Ok(millis.map(Duration::from_millis))
}
