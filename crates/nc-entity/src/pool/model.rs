//! Pool entity model.

use chrono::{DateTime, Utc};
use nc_core::types::{PoolId, TeamId, VendorId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named set of numbers from one vendor assigned to one team.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pool {
    /// Pool identifier.
    pub id: PoolId,
    /// Unique pool name.
    pub name: String,
    /// Whether the pool takes part in rotation at all.
    pub active: bool,
    /// Set once the activation cycle has touched the pool.
    pub rotation: bool,
    /// Set when every subpool has had its turn (full lap).
    pub finish: bool,
    /// When the last full lap completed.
    pub finish_at: Option<DateTime<Utc>>,
    /// Subpool block size used by the builder.
    pub subpool_block: i32,
    /// Vendor of every number in the pool.
    pub vendor_id: VendorId,
    /// Team that dials with the pool.
    pub team_id: TeamId,
    /// Number count.
    pub num_count: i32,
    /// Subpool count.
    pub subpool_count: i32,
    /// Set while a subpool transition is in progress; rotation skips the pool.
    pub sub_activate: bool,
    /// When the pool was built.
    pub created_at: DateTime<Utc>,
}

impl Pool {
    /// Average subpool size, rounded up. Zero when the pool has no subpools.
    pub fn average_subpool_size(&self) -> i32 {
        if self.subpool_count <= 0 {
            return 0;
        }
        (self.num_count + self.subpool_count - 1) / self.subpool_count
    }
}

/// Data required to create a pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPool {
    /// Unique pool name.
    pub name: String,
    /// Subpool block size.
    pub subpool_block: i32,
    /// Vendor.
    pub vendor_id: VendorId,
    /// Team.
    pub team_id: TeamId,
    /// Number count.
    pub num_count: i32,
    /// Subpool count.
    pub subpool_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(num_count: i32, subpool_count: i32) -> Pool {
        Pool {
            id: PoolId(1),
            name: "p".into(),
            active: true,
            rotation: false,
            finish: false,
            finish_at: None,
            subpool_block: 4,
            vendor_id: VendorId(1),
            team_id: TeamId(1),
            num_count,
            subpool_count,
            sub_activate: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_average_subpool_size_rounds_up() {
        assert_eq!(pool(10, 3).average_subpool_size(), 4);
        assert_eq!(pool(8, 2).average_subpool_size(), 4);
        assert_eq!(pool(0, 0).average_subpool_size(), 0);
    }
}
