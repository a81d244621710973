//! Converted file download.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use tracing::debug;

use convgate_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /download/{filename}
///
/// Streams a converted file as an attachment. Names that are not a single
/// plain path component are rejected with 400; unknown names yield 404.
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let file = state.store.open_converted(&filename).await?;
    debug!(name = %file.name, size = file.size, "Serving converted file");

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.name),
        )
        .header(header::CONTENT_LENGTH, file.size)
        .body(Body::from_stream(file.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}
