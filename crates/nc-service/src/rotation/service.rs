//! Team-level rotation entry point.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use nc_client::DisplayPusher;
use nc_core::error::AppError;
use nc_core::result::AppResult;
use nc_core::types::TeamId;
use nc_database::RotationStore;

use super::pool::PoolRotator;
use super::report::{PoolRotation, RotationOutcome, RotationReport};
use crate::actuality::ActualityService;

/// Rotates the live number of every active pool of a team.
#[derive(Clone)]
pub struct RotationService {
    rotator: PoolRotator,
}

impl std::fmt::Debug for RotationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationService").finish()
    }
}

impl RotationService {
    /// Creates a new rotation service.
    pub fn new(
        store: Arc<dyn RotationStore>,
        pusher: Arc<dyn DisplayPusher>,
        actuality: ActualityService,
    ) -> Self {
        Self {
            rotator: PoolRotator {
                store,
                pusher,
                actuality,
            },
        }
    }

    /// Rotate every active pool of the team, one task per pool.
    ///
    /// Returns once every pool task finished. Per-pool failures are in
    /// the report; only a failed team or pool lookup is an `Err`.
    pub async fn rotate_team(
        &self,
        team_id: TeamId,
        cancel: CancellationToken,
    ) -> AppResult<RotationReport> {
        let store = &self.rotator.store;
        let team = store
            .find_team(team_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Team {team_id} not found")))?;
        let team = Arc::new(team);
        let pools = store.list_active_pools(Some(team_id)).await?;

        let mut tasks = JoinSet::new();
        let mut pool_of_task = HashMap::new();
        for pool in pools {
            let rotator = self.rotator.clone();
            let team = Arc::clone(&team);
            let cancel = cancel.clone();
            let pool_id = pool.id;
            let handle = tasks.spawn(async move {
                let outcome = rotator.rotate(&team, &pool, &cancel).await;
                PoolRotation {
                    pool_id: pool.id,
                    outcome,
                }
            });
            pool_of_task.insert(handle.id(), pool_id);
        }

        let mut pools = Vec::with_capacity(pool_of_task.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => pools.push(entry),
                Err(e) => {
                    let Some(pool_id) = pool_of_task.get(&e.id()).copied() else {
                        error!(team_id = %team_id, error = %e, "Unknown rotation task failed");
                        continue;
                    };
                    error!(team_id = %team_id, pool_id = %pool_id, error = %e, "Rotation task aborted");
                    pools.push(PoolRotation {
                        pool_id,
                        outcome: RotationOutcome::Failed {
                            error: AppError::internal(format!("Rotation task aborted: {e}")),
                        },
                    });
                }
            }
        }
        pools.sort_by_key(|p| p.pool_id);

        let report = RotationReport { team_id, pools };
        info!(
            team_id = %team_id,
            pools = report.pools.len(),
            rotated = report.rotated(),
            failed = report.failed(),
            cancelled = report.cancelled(),
            "Team rotation finished"
        );
        Ok(report)
    }
}
