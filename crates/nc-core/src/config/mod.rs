//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. The loaded [`AppConfig`] is immutable; runtime reloads go
//! through [`ConfigHandle`], which publishes a fresh snapshot.

pub mod app;
pub mod database;
pub mod handle;
pub mod logging;
pub mod rotation;
pub mod vendor;
pub mod webitel;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::database::DatabaseConfig;
pub use self::handle::{ConfigHandle, ConfigSource};
pub use self::logging::LoggingConfig;
pub use self::rotation::RotationConfig;
pub use self::vendor::VendorControlConfig;
pub use self::webitel::WebitelConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Scheduler and activation timer settings.
    #[serde(default)]
    pub rotation: RotationConfig,
    /// Call-center push client settings.
    pub webitel: WebitelConfig,
    /// Vendor-control (actuality) client settings.
    pub vendor_control: VendorControlConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `NC__` (e.g.
    /// `NC__DATABASE__URL`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("NC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Load configuration from a single file path plus the environment overlay.
    pub fn load_file(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("NC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to read '{path}': {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an in-memory TOML string.
    pub fn from_toml(raw: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
