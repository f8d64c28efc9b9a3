//! Number repository implementation.

use sqlx::{PgPool, Postgres, QueryBuilder};

use nc_core::error::{AppError, ErrorKind};
use nc_core::result::AppResult;
use nc_core::types::{NumberId, PoolId, SubPoolId};
use nc_entity::{NewNumber, Number};

/// Rows per multi-row `INSERT`; five binds each stays far below the
/// protocol's parameter limit.
const INSERT_CHUNK: usize = 1_000;

/// Repository for caller-ID numbers.
#[derive(Debug, Clone)]
pub struct NumberRepository {
    pool: PgPool,
}

impl NumberRepository {
    /// Create a new number repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a number by ID.
    pub async fn find_by_id(&self, id: NumberId) -> AppResult<Option<Number>> {
        sqlx::query_as::<_, Number>("SELECT * FROM numbers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find number", e))
    }

    /// List a pool's numbers.
    pub async fn find_by_pool(&self, pool_id: PoolId) -> AppResult<Vec<Number>> {
        sqlx::query_as::<_, Number>("SELECT * FROM numbers WHERE pool_id = $1 ORDER BY id")
            .bind(pool_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list numbers", e))
    }

    /// Insert numbers in order. Ids follow input order.
    pub async fn create_batch(&self, data: &[NewNumber]) -> AppResult<u64> {
        let mut written = 0;
        for chunk in data.chunks(INSERT_CHUNK) {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO numbers (value, pool_id, subpool_id, vendor_id, team_id) ",
            );
            builder.push_values(chunk, |mut row, number| {
                row.push_bind(&number.value)
                    .push_bind(number.pool_id)
                    .push_bind(number.subpool_id)
                    .push_bind(number.vendor_id)
                    .push_bind(number.team_id);
            });
            let result = builder.build().execute(&self.pool).await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to insert numbers", e)
            })?;
            written += result.rows_affected();
        }
        Ok(written)
    }

    /// Smallest-id eligible number of the subpool.
    pub async fn next_selectable(&self, subpool_id: SubPoolId) -> AppResult<Option<Number>> {
        sqlx::query_as::<_, Number>(
            "SELECT * FROM numbers WHERE subpool_id = $1 AND NOT label AND enabled \
             ORDER BY id LIMIT 1",
        )
        .bind(subpool_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to select next number", e))
    }

    /// Clear `label` in one subpool.
    pub async fn clear_labels_in_subpool(&self, subpool_id: SubPoolId) -> AppResult<u64> {
        let result = sqlx::query("UPDATE numbers SET label = FALSE WHERE subpool_id = $1")
            .bind(subpool_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear labels", e))?;
        Ok(result.rows_affected())
    }

    /// Clear `label` in a whole pool.
    pub async fn clear_labels_in_pool(&self, pool_id: PoolId) -> AppResult<u64> {
        let result = sqlx::query("UPDATE numbers SET label = FALSE WHERE pool_id = $1")
            .bind(pool_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear labels", e))?;
        Ok(result.rows_affected())
    }

    /// Make a number live.
    pub async fn mark_live(&self, id: NumberId) -> AppResult<()> {
        sqlx::query(
            "UPDATE numbers SET active = TRUE, label = TRUE, used = TRUE, spin = spin + 1, \
             activated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to activate number", e))?;
        Ok(())
    }

    /// Take a number off the air.
    pub async fn deactivate(&self, id: NumberId) -> AppResult<()> {
        sqlx::query("UPDATE numbers SET active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to deactivate number", e))?;
        Ok(())
    }

    /// Numbers of a pool with `active = true`.
    pub async fn find_live_in_pool(&self, pool_id: PoolId) -> AppResult<Vec<Number>> {
        sqlx::query_as::<_, Number>(
            "SELECT * FROM numbers WHERE pool_id = $1 AND active = TRUE ORDER BY id",
        )
        .bind(pool_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list live numbers", e))
    }

    /// Include or exclude numbers from selection.
    pub async fn set_enabled(&self, ids: &[NumberId], enabled: bool) -> AppResult<u64> {
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let result = sqlx::query("UPDATE numbers SET enabled = $2 WHERE id = ANY($1) AND enabled <> $2")
            .bind(raw)
            .bind(enabled)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update numbers", e))?;
        Ok(result.rows_affected())
    }

    /// Non-live numbers of a subpool eligible for redistribution.
    pub async fn find_movable(&self, subpool_id: SubPoolId, limit: i64) -> AppResult<Vec<Number>> {
        sqlx::query_as::<_, Number>(
            "SELECT * FROM numbers WHERE subpool_id = $1 AND NOT active ORDER BY id LIMIT $2",
        )
        .bind(subpool_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list movable numbers", e))
    }

    /// Count numbers in a subpool.
    pub async fn count_in_subpool(&self, subpool_id: SubPoolId) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM numbers WHERE subpool_id = $1")
            .bind(subpool_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count numbers", e))
    }

    /// Reassign a number.
    pub async fn move_to(&self, id: NumberId, pool_id: PoolId, subpool_id: SubPoolId) -> AppResult<()> {
        sqlx::query("UPDATE numbers SET pool_id = $2, subpool_id = $3 WHERE id = $1")
            .bind(id)
            .bind(pool_id)
            .bind(subpool_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to move number", e))?;
        Ok(())
    }
}
