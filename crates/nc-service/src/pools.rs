//! Pool queries and deletion.

use std::sync::Arc;

use tracing::info;

use nc_core::error::AppError;
use nc_core::result::AppResult;
use nc_core::types::{PoolId, TeamId};
use nc_database::RotationStore;
use nc_entity::{Pool, SubPool};

/// Read access to pools plus explicit deletion.
#[derive(Clone)]
pub struct PoolService {
    store: Arc<dyn RotationStore>,
}

impl std::fmt::Debug for PoolService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolService").finish()
    }
}

impl PoolService {
    /// Creates a new pool service.
    pub fn new(store: Arc<dyn RotationStore>) -> Self {
        Self { store }
    }

    /// List pools, optionally for one team.
    pub async fn list(&self, team_id: Option<TeamId>) -> AppResult<Vec<Pool>> {
        self.store.list_pools(team_id).await
    }

    /// Get one pool.
    pub async fn get(&self, id: PoolId) -> AppResult<Pool> {
        self.store
            .find_pool(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Pool {id} not found")))
    }

    /// A pool's subpools in index order.
    pub async fn subpools(&self, id: PoolId) -> AppResult<Vec<SubPool>> {
        self.get(id).await?;
        self.store.list_subpools(id).await
    }

    /// Delete a pool with its subpools, numbers and logs.
    pub async fn delete(&self, id: PoolId) -> AppResult<()> {
        if !self.store.delete_pool(id).await? {
            return Err(AppError::not_found(format!("Pool {id} not found")));
        }
        info!(pool_id = %id, "Pool deleted");
        Ok(())
    }
}
