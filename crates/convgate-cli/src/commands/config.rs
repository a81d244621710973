//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use convgate_core::config::AppConfig;
use convgate_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration (token masked)
    Show,
    /// Validate configuration file and environment overrides
    Validate,
    /// Generate a default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = masked(super::load_config(config_path)?);
            output::print_item(&config, format);
        }
        ConfigCommand::Validate => match super::load_validated_config(config_path) {
            Ok(config) => {
                output::print_success(&format!("Configuration '{}' is valid", config_path));
                output::print_kv("Server", &config.server.bind_address());
                output::print_kv("Data root", &config.storage.data_root);
                output::print_kv("Upstream", &config.upstream.endpoint);
                output::print_kv(
                    "Formats",
                    &format!(
                        "{} -> {}",
                        config.upstream.from_format, config.upstream.to_format
                    ),
                );
                output::print_kv("Token", &mask_token(&config.upstream.token));
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {}", e));
                return Err(e);
            }
        },
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AppError::internal(format!("Failed to create dir: {}", e)))?;
            }

            tokio::fs::write(out_path, default_config)
                .await
                .map_err(|e| AppError::internal(format!("Failed to write config: {}", e)))?;

            output::print_success(&format!("Default config written to '{}'", out_path));
        }
    }

    Ok(())
}

fn masked(mut config: AppConfig) -> AppConfig {
    config.upstream.token = mask_token(&config.upstream.token);
    config
}

/// Tokens shorter than this are masked entirely.
const MIN_PARTIAL_MASK_CHARS: usize = 12;

/// Mask the upstream token for display.
///
/// At most a quarter of the token, and never more than four characters,
/// is shown.
fn mask_token(token: &str) -> String {
    if token.is_empty() {
        return "(unset)".to_string();
    }
    let len = token.chars().count();
    if len < MIN_PARTIAL_MASK_CHARS {
        return "****".to_string();
    }
    let prefix: String = token.chars().take((len / 4).min(4)).collect();
    format!("{prefix}****")
}
