//! Subpool entity model.

use chrono::{DateTime, Utc};
use nc_core::types::{NumberId, PoolId, SubPoolId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::SubPoolStatus;

/// An ordered partition of a pool; exactly one is live at a time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubPool {
    /// Subpool identifier.
    pub id: SubPoolId,
    /// Owning pool.
    pub pool_id: PoolId,
    /// Position in the activation order, starting at 0.
    pub index: i32,
    /// Lifecycle status.
    pub status: SubPoolStatus,
    /// When the subpool was last activated.
    pub activated_at: Option<DateTime<Utc>>,
    /// How many times the subpool was activated or wrapped.
    pub spin: i32,
    /// Number that is currently live from this subpool.
    pub last_nid: Option<NumberId>,
    /// Marks the subpool most recently moved out of `active`.
    pub last_changed: bool,
}

/// Data required to create a subpool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubPool {
    /// Owning pool.
    pub pool_id: PoolId,
    /// Position in the activation order.
    pub index: i32,
}
