//! AR viewer page creation and hosting.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, header};
use axum::response::Html;
use tracing::info;
use validator::Validate;

use convgate_core::error::AppError;

use crate::dto::request::CreateViewerRequest;
use crate::dto::response::ViewerResponse;
use crate::error::ApiError;
use crate::state::AppState;
use crate::viewer::{qr_data_url, render_page, resolve_source};

/// POST /api/viewer
///
/// Renders a `<model-viewer>` page for `src` (and `iosSrc` for Quick Look),
/// stores it, and returns its public URL with a QR code for phones.
pub async fn create_viewer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateViewerRequest>,
) -> Result<Json<ViewerResponse>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))?;

    let viewer = &state.config.viewer;
    let base_url = public_base_url(viewer.base_url(), &headers)?;

    let src = resolve_source(&req.src, &base_url)?;
    let ios_src = req
        .ios_src
        .as_deref()
        .map(|ios| resolve_source(ios, &base_url))
        .transpose()?;

    let html = render_page(&viewer.model_viewer_script, &src, ios_src.as_deref());
    let name = state.store.write_viewer_page(&html).await?;

    let hosted_url = format!("{base_url}/viewer/{name}");
    let qr_code = qr_data_url(&hosted_url, viewer.qr_module_pixels)?;
    info!(page = %name, src = %src, "Created viewer page");

    Ok(Json(ViewerResponse {
        hosted_url,
        qr_code,
    }))
}

/// GET /viewer/{name}
pub async fn show_viewer(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Html<String>, ApiError> {
    Ok(Html(state.store.read_viewer_page(&name).await?))
}

/// Configured origin, or `http://<Host>` when none is configured.
fn public_base_url(configured: Option<&str>, headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(base) = configured {
        return Ok(base.to_string());
    }
    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty() && !h.contains(['/', '\\', '@']))
        .map(|host| format!("http://{host}"))
        .ok_or_else(|| {
            AppError::validation("Cannot determine the public URL: set viewer.public_base_url")
        })
}
