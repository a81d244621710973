//! Route definitions for the conversion gateway.
//!
//! The upload form, download and viewer page routes sit at the root, as
//! browsers hit them directly; JSON endpoints are mounted under `/api`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Room left in the request body for multipart boundaries and headers on
/// top of the configured file size limit.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Build the Axum router with all routes.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let body_limit = match state.config.storage.max_upload_size_bytes {
        Some(max) => DefaultBodyLimit::max(
            usize::try_from(max.saturating_add(MULTIPART_OVERHEAD_BYTES)).unwrap_or(usize::MAX),
        ),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route(
            "/",
            get(handlers::convert::index).post(handlers::convert::convert),
        )
        .route("/download/{filename}", get(handlers::download::download))
        .route("/viewer/{name}", get(handlers::viewer::show_viewer))
        .nest("/api", api_routes())
        .layer(body_limit)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// JSON endpoints: health and viewer creation
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
        .route("/viewer", post(handlers::viewer::create_viewer))
}
