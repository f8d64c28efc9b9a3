//! Caller-ID number entity.

use chrono::{DateTime, Utc};
use nc_core::types::{NumberId, PoolId, SubPoolId, TeamId, VendorId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A caller-ID number leased from a vendor.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Number {
    /// Number identifier.
    pub id: NumberId,
    /// The dialable value, as supplied.
    pub value: String,
    /// Owning pool.
    pub pool_id: PoolId,
    /// Owning subpool.
    pub subpool_id: SubPoolId,
    /// Vendor.
    pub vendor_id: VendorId,
    /// Team.
    pub team_id: TeamId,
    /// How many times the number went live.
    pub spin: i32,
    /// Ever went live.
    pub used: bool,
    /// Went live in the current lap of its subpool.
    pub label: bool,
    /// Currently live.
    pub active: bool,
    /// Eligible for selection; cleared by exclusion.
    pub enabled: bool,
    /// When the number last went live.
    pub activated_at: Option<DateTime<Utc>>,
}

impl Number {
    /// Whether rotation may pick the number in the current lap.
    pub fn is_selectable(&self) -> bool {
        self.enabled && !self.label
    }
}

/// Data required to create a number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNumber {
    /// The dialable value.
    pub value: String,
    /// Owning pool.
    pub pool_id: PoolId,
    /// Owning subpool.
    pub subpool_id: SubPoolId,
    /// Vendor.
    pub vendor_id: VendorId,
    /// Team.
    pub team_id: TeamId,
}
