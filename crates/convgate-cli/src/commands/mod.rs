//! CLI command definitions and dispatch.

pub mod config;
pub mod convert;
pub mod list;
pub mod serve;

use clap::{Parser, Subcommand};

use convgate_core::config::{AppConfig, LoggingConfig};
use convgate_core::error::AppError;

use crate::output::OutputFormat;

/// Convgate: GLB to USDZ conversion gateway
#[derive(Debug, Parser)]
#[command(name = "convgate", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "CONVGATE_CONFIG", default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the gateway server
    Serve(serve::ServeArgs),
    /// Convert a local file through the conversion service
    Convert(convert::ConvertArgs),
    /// List converted files
    List,
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.config).await,
            Commands::Convert(args) => convert::execute(args, &self.config, self.format).await,
            Commands::List => list::execute(&self.config, self.format).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }

    /// Logging settings from the config file, for commands that run the
    /// server. `None` when the command logs to the console only, or when the
    /// file cannot be loaded (the command itself reports that error).
    pub fn logging_config(&self) -> Option<LoggingConfig> {
        match self.command {
            Commands::Serve(_) => load_config(&self.config).ok().map(|c| c.logging),
            _ => None,
        }
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        match self.command {
            Commands::Serve(_) => "info",
            _ => "warn",
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: load configuration and reject it when unusable
pub fn load_validated_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_validated(config_path)
}
