//! Vendor repository implementation.

use sqlx::PgPool;

use nc_core::error::{AppError, ErrorKind};
use nc_core::result::AppResult;
use nc_core::types::VendorId;
use nc_entity::{NewVendor, Vendor};

/// Repository for vendor rows.
#[derive(Debug, Clone)]
pub struct VendorRepository {
    pool: PgPool,
}

impl VendorRepository {
    /// Create a new vendor repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a vendor by ID.
    pub async fn find_by_id(&self, id: VendorId) -> AppResult<Option<Vendor>> {
        sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find vendor", e))
    }

    /// Register a vendor.
    pub async fn create(&self, data: &NewVendor) -> AppResult<Vendor> {
        sqlx::query_as::<_, Vendor>("INSERT INTO vendors (name) VALUES ($1) RETURNING *")
            .bind(&data.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create vendor", e))
    }
}
