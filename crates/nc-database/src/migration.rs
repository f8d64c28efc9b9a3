//! Schema migration runner.

use sqlx::PgPool;
use tracing::info;

use nc_core::error::{AppError, ErrorKind};

/// Apply every pending migration from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Applying database migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database schema is up to date");
    Ok(())
}
