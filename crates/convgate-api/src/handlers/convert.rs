//! Upload form and conversion endpoint.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use futures::TryStreamExt;

use convgate_converter::ConversionOutcome;
use convgate_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

/// GET /
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(upload_form(&state.config.upstream.target_label()))
}

/// POST /
///
/// Spools the `file` part, forwards it to the conversion service and
/// answers with a download link, or with the upstream status as a 200
/// plain-text body when the service refuses the file.
pub async fn convert(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let limit = state.config.storage.max_upload_size_bytes;

    let upload = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(multipart_error)?
            .ok_or_else(|| AppError::validation("No file part in the request"))?;

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if file_name.is_empty() {
            return Err(AppError::validation("No file selected").into());
        }

        let stream = Box::pin(field.map_err(multipart_error));
        break state.store.spool_upload(&file_name, stream, limit).await?;
    };

    let label = state.config.upstream.target_label();
    let response = match state.processor.process(upload).await? {
        ConversionOutcome::Converted(file) => {
            Html(download_link(&file.download_path, &label)).into_response()
        }
        ConversionOutcome::Failed { status, .. } => {
            ConversionOutcome::failure_message(status).into_response()
        }
    };

    Ok(response)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(err.body_text())
    } else {
        AppError::validation(format!("Multipart error: {}", err.body_text()))
    }
}

fn upload_form(label: &str) -> String {
    format!(
        r#"<form method="post" enctype="multipart/form-data">
  <input type="file" name="{FILE_FIELD}">
  <input type="submit" value="Convert to {label}">
</form>
"#
    )
}

fn download_link(path: &str, label: &str) -> String {
    format!(r#"<a href="{path}">Download {label}</a>"#)
}
