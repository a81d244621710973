//! Convert a local file through the conversion service.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use convgate_converter::{ConversionOutcome, ConversionProcessor};
use convgate_core::error::AppError;
use convgate_storage::LocalStore;

use crate::output::{self, OutputFormat};

/// Arguments for the convert command
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// File to convert; it is copied, never modified or removed
    pub path: PathBuf,

    /// Override the source format sent to the service
    #[arg(long)]
    pub from_format: Option<String>,

    /// Override the target format requested from the service
    #[arg(long)]
    pub to_format: Option<String>,
}

/// Conversion display row
#[derive(Debug, Serialize, Tabled)]
struct ConversionRow {
    /// Stored file name
    file: String,
    /// Output size
    size: String,
    /// Upstream attempts
    attempts: u32,
    /// Duration in milliseconds
    duration_ms: u64,
    /// Location on disk
    location: String,
}

/// Execute the convert command
pub async fn execute(
    args: &ConvertArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut config = super::load_config(config_path)?;
    if let Some(ref from) = args.from_format {
        config.upstream.from_format = from.clone();
    }
    if let Some(ref to) = args.to_format {
        config.upstream.to_format = to.clone();
    }
    config.validate()?;

    let store = LocalStore::new(&config.storage).await?;
    let processor = ConversionProcessor::new(&config, store.clone())?;

    let upload = store.spool_local_file(&args.path).await?;
    match processor.process(upload).await? {
        ConversionOutcome::Converted(file) => {
            let row = ConversionRow {
                location: store
                    .converted_dir()
                    .join(&file.file_name)
                    .display()
                    .to_string(),
                file: file.file_name,
                size: output::format_bytes(file.size_bytes),
                attempts: file.attempts,
                duration_ms: file.duration_ms,
            };
            output::print_list(&[row], format);
            Ok(())
        }
        ConversionOutcome::Failed { status, .. } => Err(AppError::external_service(
            ConversionOutcome::failure_message(status),
        )),
    }
}
