//! Pool repository implementation.

use sqlx::PgPool;

use nc_core::error::{AppError, ErrorKind};
use nc_core::result::AppResult;
use nc_core::types::{PoolId, TeamId};
use nc_entity::{NewPool, Pool};

/// Repository for pool rows and their rotation flags.
#[derive(Debug, Clone)]
pub struct PoolRepository {
    pool: PgPool,
}

impl PoolRepository {
    /// Create a new pool repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a pool by ID.
    pub async fn find_by_id(&self, id: PoolId) -> AppResult<Option<Pool>> {
        sqlx::query_as::<_, Pool>("SELECT * FROM pools WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find pool", e))
    }

    /// Check whether a pool name is taken.
    pub async fn name_exists(&self, name: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM pools WHERE name = $1)")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check pool name", e))
    }

    /// List pools, optionally for one team.
    pub async fn find_all(&self, team_id: Option<TeamId>) -> AppResult<Vec<Pool>> {
        sqlx::query_as::<_, Pool>(
            "SELECT * FROM pools WHERE ($1::BIGINT IS NULL OR team_id = $1) ORDER BY id",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list pools", e))
    }

    /// List active pools, optionally for one team.
    pub async fn find_active(&self, team_id: Option<TeamId>) -> AppResult<Vec<Pool>> {
        sqlx::query_as::<_, Pool>(
            "SELECT * FROM pools WHERE active AND ($1::BIGINT IS NULL OR team_id = $1) ORDER BY id",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list active pools", e))
    }

    /// Create a pool.
    pub async fn create(&self, data: &NewPool) -> AppResult<Pool> {
        sqlx::query_as::<_, Pool>(
            "INSERT INTO pools (name, subpool_block, vendor_id, team_id, num_count, subpool_count) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&data.name)
        .bind(data.subpool_block)
        .bind(data.vendor_id)
        .bind(data.team_id)
        .bind(data.num_count)
        .bind(data.subpool_count)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create pool", e))
    }

    /// Raise `sub_activate` and `rotation`.
    pub async fn begin_transition(&self, id: PoolId) -> AppResult<()> {
        self.execute(
            "UPDATE pools SET sub_activate = TRUE, rotation = TRUE WHERE id = $1",
            id,
            "Failed to flag subpool transition",
        )
        .await
    }

    /// Clear `sub_activate`.
    pub async fn end_transition(&self, id: PoolId) -> AppResult<()> {
        self.execute(
            "UPDATE pools SET sub_activate = FALSE WHERE id = $1",
            id,
            "Failed to clear subpool transition",
        )
        .await
    }

    /// Mark a completed lap.
    pub async fn mark_finished(&self, id: PoolId) -> AppResult<()> {
        self.execute(
            "UPDATE pools SET finish = TRUE, finish_at = NOW() WHERE id = $1",
            id,
            "Failed to mark pool finished",
        )
        .await
    }

    /// Recompute the stored counters from the child rows.
    pub async fn refresh_counts(&self, id: PoolId) -> AppResult<Pool> {
        sqlx::query_as::<_, Pool>(
            "UPDATE pools SET \
                num_count = (SELECT COUNT(*) FROM numbers WHERE pool_id = $1)::INT, \
                subpool_count = (SELECT COUNT(*) FROM subpools WHERE pool_id = $1)::INT \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to refresh pool counts", e))?
        .ok_or_else(|| AppError::not_found(format!("Pool {id} not found")))
    }

    /// Delete a pool; children go with it through `ON DELETE CASCADE`.
    pub async fn delete(&self, id: PoolId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM pools WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete pool", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn execute(&self, sql: &'static str, id: PoolId, context: &'static str) -> AppResult<()> {
        sqlx::query(sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, context, e))?;
        Ok(())
    }
}
