//! Subpool repository implementation.

use sqlx::PgPool;

use nc_core::error::{AppError, ErrorKind};
use nc_core::result::AppResult;
use nc_core::types::{NumberId, PoolId, SubPoolId};
use nc_entity::{NewSubPool, SubPool, SubPoolStatus};

/// Repository for subpool rows.
#[derive(Debug, Clone)]
pub struct SubPoolRepository {
    pool: PgPool,
}

impl SubPoolRepository {
    /// Create a new subpool repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a subpool by ID.
    pub async fn find_by_id(&self, id: SubPoolId) -> AppResult<Option<SubPool>> {
        sqlx::query_as::<_, SubPool>("SELECT * FROM subpools WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find subpool", e))
    }

    /// List a pool's subpools in activation order.
    pub async fn find_by_pool(&self, pool_id: PoolId) -> AppResult<Vec<SubPool>> {
        sqlx::query_as::<_, SubPool>(r#"SELECT * FROM subpools WHERE pool_id = $1 ORDER BY "index""#)
            .bind(pool_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list subpools", e))
    }

    /// List a pool's subpools with one status in activation order.
    pub async fn find_by_status(
        &self,
        pool_id: PoolId,
        status: SubPoolStatus,
    ) -> AppResult<Vec<SubPool>> {
        sqlx::query_as::<_, SubPool>(
            r#"SELECT * FROM subpools WHERE pool_id = $1 AND status = $2 ORDER BY "index""#,
        )
        .bind(pool_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list subpools", e))
    }

    /// Create an inactive subpool.
    pub async fn create(&self, data: &NewSubPool) -> AppResult<SubPool> {
        sqlx::query_as::<_, SubPool>(
            r#"INSERT INTO subpools (pool_id, "index") VALUES ($1, $2) RETURNING *"#,
        )
        .bind(data.pool_id)
        .bind(data.index)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create subpool", e))
    }

    /// Move one subpool to `used` and make it the only `last_changed` sibling.
    pub async fn retire(&self, pool_id: PoolId, id: SubPoolId) -> AppResult<()> {
        sqlx::query(
            "UPDATE subpools SET \
                last_changed = (id = $2), \
                status = CASE WHEN id = $2 THEN 'used'::subpool_status ELSE status END, \
                activated_at = CASE WHEN id = $2 THEN COALESCE(activated_at, NOW()) ELSE activated_at END \
             WHERE pool_id = $1",
        )
        .bind(pool_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to retire subpool", e))?;
        Ok(())
    }

    /// Make a subpool live.
    pub async fn activate(&self, id: SubPoolId) -> AppResult<()> {
        sqlx::query(
            "UPDATE subpools SET status = 'active', spin = spin + 1, activated_at = NOW(), \
             last_nid = NULL WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to activate subpool", e))?;
        Ok(())
    }

    /// Put every subpool of the pool back to `inactive`.
    pub async fn reset_all(&self, pool_id: PoolId) -> AppResult<u64> {
        let result = sqlx::query("UPDATE subpools SET status = 'inactive' WHERE pool_id = $1")
            .bind(pool_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reset subpools", e))?;
        Ok(result.rows_affected())
    }

    /// `spin += 1`.
    pub async fn increment_spin(&self, id: SubPoolId) -> AppResult<()> {
        sqlx::query("UPDATE subpools SET spin = spin + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to bump subpool spin", e))?;
        Ok(())
    }

    /// Record the live number of the subpool.
    pub async fn set_last_nid(&self, id: SubPoolId, number_id: Option<NumberId>) -> AppResult<()> {
        sqlx::query("UPDATE subpools SET last_nid = $2 WHERE id = $1")
            .bind(id)
            .bind(number_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set last number", e))?;
        Ok(())
    }

    /// Highest index in the pool.
    pub async fn max_index(&self, pool_id: PoolId) -> AppResult<Option<i32>> {
        sqlx::query_scalar::<_, Option<i32>>(r#"SELECT MAX("index") FROM subpools WHERE pool_id = $1"#)
            .bind(pool_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read max subpool index", e))
    }
}
