//! Number vendor entity.

use chrono::{DateTime, Utc};
use nc_core::types::VendorId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A carrier that leases caller-ID numbers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vendor {
    /// Vendor identifier.
    pub id: VendorId,
    /// Display name.
    pub name: String,
    /// When the vendor was registered.
    pub created_at: DateTime<Utc>,
}

/// Data required to register a vendor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVendor {
    /// Display name.
    pub name: String,
}
