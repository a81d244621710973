//! AR viewer page configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Settings for the hosted model-viewer pages.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Public origin the gateway is reachable at, e.g. `https://ar.example.com`.
    ///
    /// Used for hosted page links, QR codes and relative model sources.
    /// When unset, the request's `Host` header is used over plain HTTP.
    #[validate(url)]
    pub public_base_url: Option<String>,

    /// URL of the `<model-viewer>` web component module.
    #[validate(url)]
    pub model_viewer_script: String,

    /// Pixel size of one QR module in the generated PNG.
    #[validate(range(min = 1, max = 32))]
    pub qr_module_pixels: u32,
}

impl ViewerConfig {
    /// Configured public origin without a trailing slash.
    pub fn base_url(&self) -> Option<&str> {
        self.public_base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            public_base_url: None,
            model_viewer_script:
                "https://ajax.googleapis.com/ajax/libs/model-viewer/3.5.0/model-viewer.min.js"
                    .to_string(),
            qr_module_pixels: 8,
        }
    }
}
