//! Number usage log entity.

use chrono::{DateTime, Utc};
use nc_core::types::{LogId, NumberId, PoolId, SubPoolId, TeamId, VendorId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One interval during which a number was live.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsageLog {
    /// Log identifier.
    pub id: LogId,
    /// The number that was live.
    pub number_id: NumberId,
    /// Its subpool.
    pub subpool_id: SubPoolId,
    /// Its pool.
    pub pool_id: PoolId,
    /// Its vendor.
    pub vendor_id: VendorId,
    /// Its team.
    pub team_id: TeamId,
    /// When the number went live.
    pub start_at: DateTime<Utc>,
    /// When it was replaced (None = still live).
    pub end_at: Option<DateTime<Utc>>,
    /// Free-form note.
    pub comment: Option<String>,
}

impl UsageLog {
    /// Whether the interval is still open.
    pub fn is_open(&self) -> bool {
        self.end_at.is_none()
    }
}

/// Data required to open a usage log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUsageLog {
    /// The number going live.
    pub number_id: NumberId,
    /// Its subpool.
    pub subpool_id: SubPoolId,
    /// Its pool.
    pub pool_id: PoolId,
    /// Its vendor.
    pub vendor_id: VendorId,
    /// Its team.
    pub team_id: TeamId,
    /// Free-form note.
    pub comment: Option<String>,
}
