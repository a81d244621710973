//! Unified error type for the conversion pipeline.
//!
//! Upstream, transport and storage failures are consolidated into a single
//! `ConversionError` enum that maps cleanly to
//! `convgate_core::error::AppError`.

use convgate_core::error::AppError;
use thiserror::Error;

/// Unified error type for all conversion operations.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Upload extension is not in the configured allow list.
    #[error("Unsupported file extension: {extension}")]
    UnsupportedExtension {
        /// The rejected extension, or `(none)`.
        extension: String,
    },

    /// Configured endpoint is not a valid URL.
    #[error("Invalid upstream endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The configured endpoint.
        endpoint: String,
        /// Parser message.
        reason: String,
    },

    /// The upstream did not answer within the configured timeout.
    #[error("Conversion service timed out after {timeout_seconds}s")]
    UpstreamTimeout {
        /// The timeout that was exceeded.
        timeout_seconds: u64,
    },

    /// The upstream could not be reached at all.
    #[error("Conversion service unreachable at {endpoint}: {source}")]
    UpstreamUnreachable {
        /// The endpoint that was dialed.
        endpoint: String,
        /// Underlying connect error.
        #[source]
        source: reqwest::Error,
    },

    /// Any other HTTP transport failure.
    #[error("Conversion service transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Spool or converted-file storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] AppError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversionError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnreachable { .. } | Self::Transport(_))
    }

    /// Classify a reqwest error raised while talking to `endpoint`.
    pub fn from_transport(err: reqwest::Error, endpoint: &str, timeout_seconds: u64) -> Self {
        if err.is_timeout() {
            Self::UpstreamTimeout { timeout_seconds }
        } else if err.is_connect() {
            Self::UpstreamUnreachable {
                endpoint: endpoint.to_string(),
                source: err,
            }
        } else {
            Self::Transport(err)
        }
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::UnsupportedExtension { .. } => AppError::validation(err.to_string()),
            ConversionError::InvalidEndpoint { .. } => AppError::configuration(err.to_string()),
            ConversionError::UpstreamTimeout { .. } => AppError::timeout(err.to_string()),
            ConversionError::UpstreamUnreachable { .. } | ConversionError::Transport(_) => {
                AppError::external_service(err.to_string())
            }
            ConversionError::Storage(inner) => inner,
            ConversionError::Io(e) => e.into(),
        }
    }
}
