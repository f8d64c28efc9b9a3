//! CLI command definitions and dispatch.

pub mod migrate;
pub mod pool;
pub mod schedule;
pub mod team;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use nc_client::{VendorControlClient, WebitelClient};
use nc_core::config::AppConfig;
use nc_core::error::AppError;
use nc_database::DatabasePool;
use nc_service::Services;

/// nc: caller-ID number pool rotation
#[derive(Debug, Parser)]
#[command(name = "nc-cli", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
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
    /// Apply pending database migrations
    Migrate,
    /// Pool inspection and subpool activation
    Pool(pool::PoolArgs),
    /// Team rotation and vendor actuality
    Team(team::TeamArgs),
    /// Rotation schedules
    Schedule(schedule::ScheduleArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate => migrate::execute(&self.config).await,
            Commands::Pool(args) => pool::execute(args, &self.config, self.format).await,
            Commands::Team(args) => team::execute(args, &self.config, self.format).await,
            Commands::Schedule(args) => schedule::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_file(config_path)
}

/// Helper: connect to the database and wire every service with the real
/// HTTP clients.
pub async fn connect(config_path: &str) -> Result<(DatabasePool, Services), AppError> {
    let config = load_config(config_path)?;
    let db = DatabasePool::connect(&config.database).await?;
    let services = Services::new(
        Arc::new(db.store()),
        Arc::new(WebitelClient::new(&config.webitel)?),
        Arc::new(VendorControlClient::new(&config.vendor_control)?),
    );
    Ok((db, services))
}
