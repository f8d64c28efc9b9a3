//! Usage log repository implementation.

use sqlx::PgPool;

use nc_core::error::{AppError, ErrorKind};
use nc_core::result::AppResult;
use nc_core::types::{NumberId, PoolId, SubPoolId};
use nc_entity::{NewUsageLog, UsageLog};

/// Repository for the append-only `logs` table.
#[derive(Debug, Clone)]
pub struct UsageLogRepository {
    pool: PgPool,
}

impl UsageLogRepository {
    /// Create a new usage log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a log row.
    pub async fn open(&self, data: &NewUsageLog) -> AppResult<UsageLog> {
        sqlx::query_as::<_, UsageLog>(
            "INSERT INTO logs (number_id, subpool_id, pool_id, vendor_id, team_id, comment) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.number_id)
        .bind(data.subpool_id)
        .bind(data.pool_id)
        .bind(data.vendor_id)
        .bind(data.team_id)
        .bind(&data.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to open usage log", e))
    }

    /// Close the open logs of a number.
    pub async fn close_for_number(&self, number_id: NumberId) -> AppResult<u64> {
        let result =
            sqlx::query("UPDATE logs SET end_at = NOW() WHERE number_id = $1 AND end_at IS NULL")
                .bind(number_id)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to close usage logs", e))?;
        Ok(result.rows_affected())
    }

    /// Close the open logs of a subpool.
    pub async fn close_for_subpool(&self, subpool_id: SubPoolId) -> AppResult<u64> {
        let result =
            sqlx::query("UPDATE logs SET end_at = NOW() WHERE subpool_id = $1 AND end_at IS NULL")
                .bind(subpool_id)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to close usage logs", e))?;
        Ok(result.rows_affected())
    }

    /// Count open logs of a subpool.
    pub async fn count_open(&self, subpool_id: SubPoolId) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM logs WHERE subpool_id = $1 AND end_at IS NULL",
        )
        .bind(subpool_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count open logs", e))
    }

    /// List a pool's logs.
    pub async fn find_by_pool(&self, pool_id: PoolId) -> AppResult<Vec<UsageLog>> {
        sqlx::query_as::<_, UsageLog>("SELECT * FROM logs WHERE pool_id = $1 ORDER BY id")
            .bind(pool_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list usage logs", e))
    }
}
