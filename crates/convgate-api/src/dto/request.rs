//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/viewer`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateViewerRequest {
    /// Model shown by the viewer, usually a GLB.
    #[validate(length(min = 1, max = 2048, message = "src is required"))]
    pub src: String,
    /// Model for iOS Quick Look, usually the converted USDZ.
    #[validate(length(min = 1, max = 2048))]
    pub ios_src: Option<String>,
}
