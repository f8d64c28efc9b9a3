//! Team repository implementation.

use sqlx::PgPool;
use sqlx::types::Json;

use nc_core::error::{AppError, ErrorKind};
use nc_core::result::AppResult;
use nc_core::types::{TeamId, VendorId};
use nc_entity::{NewTeam, Team};

/// Repository for team rows.
#[derive(Debug, Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    /// Create a new team repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a team by ID.
    pub async fn find_by_id(&self, id: TeamId) -> AppResult<Option<Team>> {
        sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find team", e))
    }

    /// List every team.
    pub async fn find_all(&self) -> AppResult<Vec<Team>> {
        sqlx::query_as::<_, Team>("SELECT * FROM teams ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list teams", e))
    }

    /// Create a team.
    pub async fn create(&self, data: &NewTeam) -> AppResult<Team> {
        sqlx::query_as::<_, Team>(
            "INSERT INTO teams (name, webitel_resource_map) VALUES ($1, $2) RETURNING *",
        )
        .bind(&data.name)
        .bind(Json(&data.webitel_resource_map))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create team", e))
    }

    /// Record the vendor currently carrying the team's traffic.
    pub async fn set_actual_vendor(
        &self,
        id: TeamId,
        vendor_id: Option<VendorId>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE teams SET actual_vendor_id = $2 WHERE id = $1")
            .bind(id)
            .bind(vendor_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to set actual vendor", e)
            })?;
        Ok(())
    }
}
