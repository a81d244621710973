//! List converted files.

use serde::Serialize;
use tabled::Tabled;

use convgate_core::error::AppError;
use convgate_storage::{LocalStore, StoredFileMeta};

use crate::output::{self, OutputFormat};

/// Converted file display row
#[derive(Debug, Serialize, Tabled)]
struct FileRow {
    /// File name
    name: String,
    /// Size
    size: String,
    /// Last modified
    modified: String,
}

impl From<&StoredFileMeta> for FileRow {
    fn from(meta: &StoredFileMeta) -> Self {
        Self {
            name: meta.name.clone(),
            size: output::format_bytes(meta.size_bytes),
            modified: meta
                .modified
                .map(|m| m.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Execute the list command
pub async fn execute(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = LocalStore::new(&config.storage).await?;
    let files = store.list_converted().await?;

    match format {
        OutputFormat::Json => output::print_item(&files, format),
        OutputFormat::Table => {
            let rows: Vec<FileRow> = files.iter().map(FileRow::from).collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
