//! # convgate-api
//!
//! HTTP layer for the conversion gateway built on Axum.
//!
//! Serves the upload form, accepts uploads for conversion, streams converted
//! files back as attachments, hosts AR viewer pages with a QR code and
//! exposes health endpoints. Also owns the
//! CORS and request-logging middleware and the mapping from domain errors to
//! HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod viewer;

pub use app::{build_app, run_server};
pub use state::AppState;
