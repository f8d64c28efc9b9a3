//! Database migration command.

use crate::output;
use nc_core::error::AppError;
use nc_database::DatabasePool;

/// Apply all pending migrations
pub async fn execute(config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = DatabasePool::connect(&config.database).await?;

    println!("Running database migrations...");
    nc_database::migration::run_migrations(db.pool()).await?;
    db.close().await;

    output::print_success("All migrations applied successfully.");
    Ok(())
}
