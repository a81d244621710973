//! Health check handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    }))
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DetailedHealthResponse>>, ApiError> {
    let storage_ok = state.store.health_check().await;
    let converted_files = if storage_ok {
        state.store.list_converted().await?.len()
    } else {
        0
    };

    Ok(Json(ApiResponse::ok(DetailedHealthResponse {
        status: if storage_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        storage: if storage_ok { "available" } else { "unavailable" }.to_string(),
        converted_files,
        upstream_endpoint: state.config.upstream.endpoint.clone(),
        conversions: state.metrics.snapshot(),
    })))
}
