//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod logging;
pub mod storage;
pub mod upstream;
pub mod viewer;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use self::app::{CorsConfig, ServerConfig};
pub use self::logging::LoggingConfig;
pub use self::storage::StorageConfig;
pub use self::upstream::UpstreamConfig;
pub use self::viewer::ViewerConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "CONVGATE";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the TOML file
/// merged with `CONVGATE__*` environment overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload spool and converted-file storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Outbound conversion service settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Hosted AR viewer pages.
    #[serde(default)]
    pub viewer: ViewerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file plus environment variables.
    ///
    /// The file is optional; every field has a default except the upstream
    /// token, which is expected from `CONVGATE__UPSTREAM__TOKEN` when the
    /// file does not set it.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("upstream.retry_on_status")
                    .with_list_parse_key("storage.allowed_extensions")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Load and validate in one step.
    pub fn load_validated(path: &str) -> Result<Self, AppError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the sections that cannot be checked by deserialization alone.
    pub fn validate(&self) -> Result<(), AppError> {
        self.upstream.validate()?;
        self.viewer.validate()?;
        if self.upstream.token.trim().is_empty() {
            return Err(AppError::configuration(
                "upstream.token must be set (e.g. via CONVGATE__UPSTREAM__TOKEN)",
            ));
        }
        if self.storage.data_root.trim().is_empty() {
            return Err(AppError::configuration("storage.data_root must not be empty"));
        }
        Ok(())
    }
}
