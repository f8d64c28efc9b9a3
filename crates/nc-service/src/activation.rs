//! Subpool activation cycle.
//!
//! Per pool: retire the live subpool, promote the next inactive one and,
//! once every subpool had its turn, start a new lap from index 0. While a
//! transition runs the pool carries `sub_activate = true`, which the
//! rotation loop treats as "skip this pool".

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use nc_core::error::AppError;
use nc_core::result::AppResult;
use nc_core::types::{PoolId, SubPoolId};
use nc_database::RotationStore;
use nc_entity::{Pool, SubPoolStatus};

use crate::actuality::ActualityService;
use crate::report::{aggregate, serialize_error};

/// What happened to one pool.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActivationOutcome {
    /// A subpool was promoted.
    Activated {
        /// Subpool moved to `used`, if one was live.
        deactivated: Option<SubPoolId>,
        /// Subpool now live.
        activated: SubPoolId,
        /// Its index.
        index: i32,
        /// Whether this started a new lap.
        wrapped: bool,
    },
    /// The pool was left alone.
    Skipped {
        /// Why.
        reason: String,
    },
    /// The transition failed.
    Failed {
        /// The error.
        #[serde(serialize_with = "serialize_error")]
        error: AppError,
    },
}

/// One pool's entry in an [`ActivationReport`].
#[derive(Debug, Clone, Serialize)]
pub struct PoolActivation {
    /// The pool.
    pub pool_id: PoolId,
    /// What happened to it.
    #[serde(flatten)]
    pub outcome: ActivationOutcome,
}

/// Outcome of one activation pass, one entry per pool.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivationReport {
    /// Per-pool outcomes in pool id order.
    pub pools: Vec<PoolActivation>,
}

impl ActivationReport {
    /// Number of pools that got a new subpool.
    pub fn activated(&self) -> usize {
        self.pools
            .iter()
            .filter(|p| matches!(p.outcome, ActivationOutcome::Activated { .. }))
            .count()
    }

    /// Every failure folded into one error.
    pub fn into_result(self) -> AppResult<Self> {
        aggregate(self.pools.iter().filter_map(|p| match &p.outcome {
            ActivationOutcome::Failed { error } => Some((p.pool_id, error)),
            _ => None,
        }))?;
        Ok(self)
    }
}

/// Runs the activation cycle.
#[derive(Clone)]
pub struct SubPoolActivator {
    store: Arc<dyn RotationStore>,
    actuality: ActualityService,
}

impl std::fmt::Debug for SubPoolActivator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubPoolActivator").finish()
    }
}

impl SubPoolActivator {
    /// Creates a new activator.
    pub fn new(store: Arc<dyn RotationStore>, actuality: ActualityService) -> Self {
        Self { store, actuality }
    }

    /// Run the cycle over every active pool.
    pub async fn activate_all(&self) -> AppResult<ActivationReport> {
        let pools = self.store.list_active_pools(None).await?;
        let mut report = ActivationReport::default();
        for pool in &pools {
            let outcome = self.activate(pool).await;
            report.pools.push(PoolActivation {
                pool_id: pool.id,
                outcome,
            });
        }
        info!(
            pools = report.pools.len(),
            activated = report.activated(),
            "Subpool activation pass finished"
        );
        Ok(report)
    }

    /// Run the cycle for one pool.
    pub async fn activate_pool(&self, pool_id: PoolId) -> AppResult<ActivationOutcome> {
        let pool = self
            .store
            .find_pool(pool_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Pool {pool_id} not found")))?;
        Ok(self.activate(&pool).await)
    }

    async fn activate(&self, pool: &Pool) -> ActivationOutcome {
        let actual = match self.actuality.is_vendor_actual(pool.team_id, pool.vendor_id).await {
            Ok(actual) => actual,
            Err(e) => return ActivationOutcome::Failed { error: e },
        };
        if !actual {
            info!(pool_id = %pool.id, vendor_id = %pool.vendor_id, "Vendor not actual; activation skipped");
            return ActivationOutcome::Skipped {
                reason: "vendor not actual".to_string(),
            };
        }

        let result = self.transition(pool).await;

        if let Err(e) = self.store.end_subpool_transition(pool.id).await {
            error!(pool_id = %pool.id, error = %e, "Failed to clear sub_activate");
            if result.is_ok() {
                return ActivationOutcome::Failed { error: e };
            }
        }

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(pool_id = %pool.id, error = %e, "Subpool activation failed");
                ActivationOutcome::Failed { error: e }
            }
        }
    }

    async fn transition(&self, pool: &Pool) -> AppResult<ActivationOutcome> {
        self.store.begin_subpool_transition(pool.id).await?;

        let deactivated = self.deactivate_current(pool.id).await?;

        let inactive = self
            .store
            .list_subpools_with_status(pool.id, SubPoolStatus::Inactive)
            .await?;
        if let Some(next) = inactive.first() {
            self.store.activate_subpool(next.id).await?;
            info!(
                pool_id = %pool.id,
                subpool_id = %next.id,
                index = next.index,
                "Subpool activated"
            );
            return Ok(ActivationOutcome::Activated {
                deactivated,
                activated: next.id,
                index: next.index,
                wrapped: false,
            });
        }

        self.wrap_around(pool.id, deactivated).await
    }

    /// Retire the lowest-index live subpool, if any.
    async fn deactivate_current(&self, pool_id: PoolId) -> AppResult<Option<SubPoolId>> {
        let active = self
            .store
            .list_subpools_with_status(pool_id, SubPoolStatus::Active)
            .await?;
        let Some(current) = active.first() else {
            return Ok(None);
        };
        self.store.retire_subpool(pool_id, current.id).await?;
        info!(pool_id = %pool_id, subpool_id = %current.id, index = current.index, "Subpool retired");
        Ok(Some(current.id))
    }

    /// Every subpool was used: reset them all and start again at index 0.
    async fn wrap_around(
        &self,
        pool_id: PoolId,
        deactivated: Option<SubPoolId>,
    ) -> AppResult<ActivationOutcome> {
        self.store.reset_subpools(pool_id).await?;
        let subpools = self.store.list_subpools(pool_id).await?;
        let first = subpools
            .first()
            .ok_or_else(|| AppError::exhausted(format!("Pool {pool_id} has no subpools")))?;

        self.store.activate_subpool(first.id).await?;
        let cleared = self.store.clear_pool_labels(pool_id).await?;
        self.store.mark_pool_finished(pool_id).await?;

        info!(
            pool_id = %pool_id,
            subpool_id = %first.id,
            labels_cleared = cleared,
            "Pool completed a full lap; restarted at first subpool"
        );
        Ok(ActivationOutcome::Activated {
            deactivated,
            activated: first.id,
            index: first.index,
            wrapped: true,
        })
    }
}
