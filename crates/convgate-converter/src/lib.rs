//! # Convgate Converter
//!
//! Forwards a spooled upload to the remote conversion service and stores
//! the converted bytes for later download.
//!
//! The remote call carries the configured `from_format` / `to_format` form
//! fields and an `Authorization: Token <secret>` header. Transport errors
//! and configured statuses are retried with exponential backoff; request
//! timeouts are not.

pub mod client;
pub mod error;
pub mod metrics;
pub mod models;
pub mod processor;

pub use client::UpstreamClient;
pub use error::ConversionError;
pub use metrics::{ConversionMetrics, MetricsSnapshot};
pub use models::{ConversionOutcome, ConvertedFile};
pub use processor::ConversionProcessor;
