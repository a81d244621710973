//! Outbound conversion service configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Settings for the third-party conversion endpoint.
///
/// The token is a secret: `Debug` output redacts it.
#[derive(Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Conversion endpoint URL.
    #[validate(url)]
    pub endpoint: String,

    /// Credential sent as `Authorization: Token <token>`.
    pub token: String,

    /// Value of the `from_format` form field.
    #[validate(length(min = 1, max = 16))]
    pub from_format: String,

    /// Value of the `to_format` form field; also the converted file extension.
    #[validate(length(min = 1, max = 16))]
    pub to_format: String,

    /// Total timeout for one outbound request, in seconds.
    #[validate(range(min = 1, max = 3600))]
    pub timeout_seconds: u64,

    /// TCP connect timeout, in seconds.
    #[validate(range(min = 1, max = 300))]
    pub connect_timeout_seconds: u64,

    /// Extra attempts after the first one for retryable failures.
    #[validate(range(min = 0, max = 5))]
    pub max_retries: u32,

    /// Base delay before the first retry; doubled on every further attempt.
    pub retry_delay_ms: u64,

    /// Upstream statuses that are retried (transport errors always are).
    pub retry_on_status: Vec<u16>,
}

impl UpstreamConfig {
    /// Backoff delay before retry number `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> std::time::Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        std::time::Duration::from_millis(self.retry_delay_ms.saturating_mul(factor))
    }

    /// Whether an upstream response with this status should be retried.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    /// Display label for the target format, e.g. `USDZ`.
    pub fn target_label(&self) -> String {
        self.to_format.to_ascii_uppercase()
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &"****")
            .field("from_format", &self.from_format)
            .field("to_format", &self.to_format)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("connect_timeout_seconds", &self.connect_timeout_seconds)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("retry_on_status", &self.retry_on_status)
            .finish()
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token: String::new(),
            from_format: "glb".to_string(),
            to_format: "usdz".to_string(),
            timeout_seconds: 120,
            connect_timeout_seconds: 10,
            max_retries: 2,
            retry_delay_ms: 500,
            retry_on_status: vec![502, 503, 504],
        }
    }
}

fn default_endpoint() -> String {
    "https://api.convert3d.org/convert".to_string()
}
