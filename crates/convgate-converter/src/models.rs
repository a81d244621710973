//! Conversion result types.

use serde::Serialize;

/// A converted file that is now available for download.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertedFile {
    /// Stored file name under the converted directory.
    pub file_name: String,
    /// Relative download path, `/download/<file_name>`.
    pub download_path: String,
    /// Size of the stored output.
    pub size_bytes: u64,
    /// Size of the forwarded input.
    pub source_bytes: u64,
    /// Upstream attempts made, including the successful one.
    pub attempts: u32,
    /// Wall-clock duration of the whole conversion.
    pub duration_ms: u64,
}

impl ConvertedFile {
    pub(crate) fn download_path_for(file_name: &str) -> String {
        format!("/download/{file_name}")
    }
}

/// Result of a conversion attempt that reached the upstream.
#[derive(Debug, Clone)]
pub enum ConversionOutcome {
    /// The upstream returned 200 and the body was stored.
    Converted(ConvertedFile),
    /// The upstream answered with a non-200 status.
    Failed {
        /// Final upstream status code.
        status: u16,
        /// Upstream attempts made.
        attempts: u32,
    },
}

impl ConversionOutcome {
    /// Message shown to the client when the upstream refused the file.
    pub fn failure_message(status: u16) -> String {
        format!("Conversion failed with status code: {status}")
    }
}
