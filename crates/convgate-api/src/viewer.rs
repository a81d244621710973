//! AR viewer pages: `<model-viewer>` HTML and the QR code linking to it.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{ImageFormat, Luma};
use qrcode::QrCode;

use convgate_core::error::AppError;
use convgate_core::result::AppResult;

/// Resolve a model source against the public origin.
///
/// Absolute `http(s)` URLs pass through; a rooted path such as
/// `/download/model.usdz` is joined to `base_url`. Anything else is rejected
/// so the page never embeds a `javascript:` or relative URL.
pub fn resolve_source(source: &str, base_url: &str) -> AppResult<String> {
    let source = source.trim();
    if source.starts_with("https://") || source.starts_with("http://") {
        Ok(source.to_string())
    } else if source.starts_with('/') && !source.starts_with("//") {
        Ok(format!("{}{}", base_url.trim_end_matches('/'), source))
    } else {
        Err(AppError::validation(format!(
            "Model source must be an http(s) URL or an absolute path: {source}"
        )))
    }
}

/// Render the viewer page for a model, with an optional Quick Look source
/// for iOS.
pub fn render_page(script_url: &str, src: &str, ios_src: Option<&str>) -> String {
    let ios_attr = ios_src
        .map(|ios| format!(r#" ios-src="{}""#, escape_attr(ios)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>3D Model Viewer</title>
  <script type="module" src="{script}"></script>
  <style>
    body {{ margin: 0; }}
    model-viewer {{ width: 100vw; height: 100vh; }}
  </style>
</head>
<body>
  <model-viewer src="{src}"{ios_attr} alt="3D model" ar ar-modes="webxr scene-viewer quick-look" camera-controls auto-rotate></model-viewer>
</body>
</html>
"#,
        script = escape_attr(script_url),
        src = escape_attr(src),
    )
}

/// Encode `url` as a QR code and return it as a PNG data URL.
pub fn qr_data_url(url: &str, module_pixels: u32) -> AppResult<String> {
    let code = QrCode::new(url.as_bytes())
        .map_err(|e| AppError::internal(format!("Failed to encode QR code: {e}")))?;
    let img = code
        .render::<Luma<u8>>()
        .module_dimensions(module_pixels, module_pixels)
        .build();

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| AppError::internal(format!("Failed to render QR code: {e}")))?;

    Ok(format!("data:image/png;base64,{}", BASE64.encode(&png)))
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
