//! Storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where uploads are spooled and converted files are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all runtime data.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Maximum upload size in bytes. Unset means no limit.
    #[serde(default)]
    pub max_upload_size_bytes: Option<u64>,
    /// Accepted upload extensions (lowercase, no dot). Empty accepts all.
    #[serde(default)]
    pub allowed_extensions: Vec<String>,
}

impl StorageConfig {
    /// Directory holding in-flight upload spools.
    pub fn uploads_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_root).join("uploads")
    }

    /// Directory holding converted files served by the download endpoint.
    pub fn converted_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_root).join("converted")
    }

    /// Directory holding generated AR viewer pages.
    pub fn viewers_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_root).join("viewers")
    }

    /// Whether an upload with the given extension may be converted.
    pub fn accepts_extension(&self, extension: Option<&str>) -> bool {
        if self.allowed_extensions.is_empty() {
            return true;
        }
        match extension {
            Some(ext) => self
                .allowed_extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            max_upload_size_bytes: None,
            allowed_extensions: Vec::new(),
        }
    }
}

fn default_data_root() -> String {
    "./data".to_string()
}
