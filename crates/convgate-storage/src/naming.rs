//! Filename rules: deriving safe storage names from untrusted client input.

use convgate_core::error::AppError;
use convgate_core::result::AppResult;

/// Fallback stem when nothing usable survives sanitization.
pub const UNNAMED_STEM: &str = "unnamed_file";

/// Longest stem kept after sanitization, in bytes.
const MAX_STEM_BYTES: usize = 200;

/// Longest name accepted by the download endpoint, in bytes.
///
/// Matches the single-component limit of common filesystems.
pub const MAX_NAME_BYTES: usize = 255;

/// Final path component of a client-supplied filename.
///
/// Browsers on some platforms send full paths; both separators are
/// treated as path boundaries regardless of the host OS.
pub fn base_name(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}

/// Lowercased extension of a client filename, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    let base = base_name(filename);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Sanitize a filename stem for safe filesystem usage.
pub fn sanitize_stem(filename: &str) -> String {
    sanitize_stem_within(filename, MAX_STEM_BYTES)
}

/// Sanitize a stem, cutting it at a character boundary so that it fits
/// in `max_bytes` of UTF-8.
fn sanitize_stem_within(filename: &str, max_bytes: usize) -> String {
    let base = base_name(filename);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    };

    let kept = stem
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .skip_while(|c| *c == '.');

    let mut sanitized = String::new();
    for c in kept {
        if sanitized.len() + c.len_utf8() > max_bytes {
            break;
        }
        sanitized.push(c);
    }

    if sanitized.is_empty() {
        UNNAMED_STEM.to_string()
    } else {
        sanitized
    }
}

/// Name of the converted file for an upload: `<stem>.<target_ext>`.
///
/// The stem is shortened as needed so the whole name stays within
/// [`MAX_NAME_BYTES`] and is therefore always downloadable.
pub fn derive_output_name(original_name: &str, target_ext: &str) -> String {
    let ext = target_ext.trim_start_matches('.');
    let budget = MAX_NAME_BYTES
        .saturating_sub(ext.len() + 1)
        .min(MAX_STEM_BYTES);
    format!("{}.{}", sanitize_stem_within(original_name, budget), ext)
}

/// Check that a download name refers to a single plain file in the
/// converted directory.
pub fn validate_download_name(name: &str) -> AppResult<()> {
    if name.is_empty() {
        return Err(AppError::validation("File name must not be empty"));
    }
    if name.len() > MAX_NAME_BYTES {
        return Err(AppError::validation("File name is too long"));
    }
    if name.starts_with('.') {
        return Err(AppError::validation(format!("Invalid file name: {name}")));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(AppError::validation(format!("Invalid file name: {name}")));
    }
    Ok(())
}

/// MIME type used when serving a stored file.
pub fn content_type_for(name: &str) -> &'static str {
    match extension_of(name).as_deref() {
        Some("usdz") => "model/vnd.usdz+zip",
        Some("glb") => "model/gltf-binary",
        Some("gltf") => "model/gltf+json",
        Some("obj") => "model/obj",
        Some("stl") => "model/stl",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}
