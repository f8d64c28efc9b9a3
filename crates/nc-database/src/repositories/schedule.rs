//! Schedule repository implementation.

use sqlx::PgPool;

use nc_core::error::{AppError, ErrorKind};
use nc_core::result::AppResult;
use nc_core::types::ScheduleId;
use nc_entity::{NewSchedule, Schedule};

/// Repository for the `schedulers` table.
#[derive(Debug, Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    /// Create a new schedule repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List every schedule.
    pub async fn find_all(&self) -> AppResult<Vec<Schedule>> {
        sqlx::query_as::<_, Schedule>("SELECT * FROM schedulers ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list schedules", e))
    }

    /// Create a schedule.
    pub async fn create(&self, data: &NewSchedule) -> AppResult<Schedule> {
        sqlx::query_as::<_, Schedule>(
            "INSERT INTO schedulers (name, start_time, stop_time, periodic_sec, team_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&data.name)
        .bind(data.start_time)
        .bind(data.stop_time)
        .bind(data.periodic_sec)
        .bind(data.team_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create schedule", e))
    }

    /// Flip the running flag.
    pub async fn set_running(&self, id: ScheduleId, running: bool) -> AppResult<()> {
        sqlx::query("UPDATE schedulers SET running = $2 WHERE id = $1")
            .bind(id)
            .bind(running)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update schedule", e))?;
        Ok(())
    }

    /// Delete a schedule.
    pub async fn delete(&self, id: ScheduleId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM schedulers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete schedule", e))?;
        Ok(result.rows_affected() > 0)
    }
}
