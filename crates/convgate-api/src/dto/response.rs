//! Response DTOs.

use serde::{Deserialize, Serialize};

use convgate_converter::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Uptime.
    pub uptime_seconds: u64,
}

/// Detailed health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status: `ok` or `degraded`.
    pub status: String,
    /// Version.
    pub version: String,
    /// Uptime.
    pub uptime_seconds: u64,
    /// Storage status: `available` or `unavailable`.
    pub storage: String,
    /// Number of converted files available for download.
    pub converted_files: usize,
    /// Upstream endpoint conversions are sent to.
    pub upstream_endpoint: String,
    /// Conversion counters and latency percentiles.
    pub conversions: MetricsSnapshot,
}

/// Hosted viewer page and the QR code pointing to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerResponse {
    /// Public URL of the viewer page.
    pub hosted_url: String,
    /// `data:image/png;base64,...` QR code encoding `hosted_url`.
    pub qr_code: String,
}
