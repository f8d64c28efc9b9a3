//! One pool's share of a rotation tick.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use nc_client::DisplayPusher;
use nc_core::error::AppError;
use nc_core::result::AppResult;
use nc_database::RotationStore;
use nc_entity::{NewUsageLog, Number, Pool, SubPool, SubPoolStatus, Team};

use super::journal;
use super::report::RotationOutcome;
use crate::actuality::ActualityService;

/// Rotates a single pool. Cheap to clone into a spawned task.
#[derive(Clone)]
pub(super) struct PoolRotator {
    pub(super) store: Arc<dyn RotationStore>,
    pub(super) pusher: Arc<dyn DisplayPusher>,
    pub(super) actuality: ActualityService,
}

impl PoolRotator {
    pub(super) async fn rotate(
        &self,
        team: &Team,
        pool: &Pool,
        cancel: &CancellationToken,
    ) -> RotationOutcome {
        if cancel.is_cancelled() {
            return RotationOutcome::Cancelled;
        }
        match self.try_rotate(team, pool, cancel).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(team_id = %team.id, pool_id = %pool.id, error = %e, "Pool rotation failed");
                RotationOutcome::Failed { error: e }
            }
        }
    }

    async fn try_rotate(
        &self,
        team: &Team,
        pool: &Pool,
        cancel: &CancellationToken,
    ) -> AppResult<RotationOutcome> {
        if pool.sub_activate {
            return Ok(RotationOutcome::skipped("subpool transition in progress"));
        }
        if !self.actuality.is_actual(team, pool.vendor_id).await {
            return Ok(RotationOutcome::skipped("vendor not actual"));
        }

        let resources = team.resources_for(pool.vendor_id);
        if resources.is_empty() {
            return Err(AppError::configuration(format!(
                "Team {} has no call-center resources for vendor {}",
                team.id, pool.vendor_id
            )));
        }

        let active = self
            .store
            .list_subpools_with_status(pool.id, SubPoolStatus::Active)
            .await?;
        let Some(subpool) = active.first() else {
            return Err(AppError::exhausted(format!(
                "Pool {} has no active subpool",
                pool.id
            )));
        };

        let Some(number) = self.select_number(pool, subpool, active.len()).await? else {
            return Ok(RotationOutcome::skipped(format!(
                "subpool {} exhausted; sibling takes over next tick",
                subpool.index
            )));
        };

        if cancel.is_cancelled() {
            return Ok(RotationOutcome::Cancelled);
        }

        self.pusher.push(&resources, &number.value).await?;

        self.store.mark_number_live(number.id).await?;
        let previous = journal::end_previous(self.store.as_ref(), pool, subpool, &number).await?;
        self.store.set_last_nid(subpool.id, Some(number.id)).await?;

        let stray = self.store.close_subpool_logs(subpool.id).await?;
        if stray > 0 {
            warn!(pool_id = %pool.id, subpool_id = %subpool.id, stray, "Closed stray open usage logs");
        }
        self.store
            .open_log(&NewUsageLog {
                number_id: number.id,
                subpool_id: subpool.id,
                pool_id: pool.id,
                vendor_id: pool.vendor_id,
                team_id: pool.team_id,
                comment: None,
            })
            .await?;

        info!(
            team_id = %team.id,
            pool_id = %pool.id,
            subpool_id = %subpool.id,
            number_id = %number.id,
            number = %number.value,
            previous = ?previous.map(|p| p.get()),
            "Number rotated"
        );

        Ok(RotationOutcome::Rotated {
            subpool_id: subpool.id,
            number_id: number.id,
            number: number.value,
            previous,
        })
    }

    /// Next eligible number of the subpool.
    ///
    /// A lone live subpool that ran dry starts a new lap of its own numbers.
    /// With live siblings the dry subpool is retired instead and `None` is
    /// returned.
    async fn select_number(
        &self,
        pool: &Pool,
        subpool: &SubPool,
        live_subpools: usize,
    ) -> AppResult<Option<Number>> {
        if let Some(number) = self.store.next_selectable_number(subpool.id).await? {
            return Ok(Some(number));
        }

        if live_subpools > 1 {
            self.store.retire_subpool(pool.id, subpool.id).await?;
            info!(pool_id = %pool.id, subpool_id = %subpool.id, "Exhausted subpool retired");
            return Ok(None);
        }

        let cleared = self.store.clear_subpool_labels(subpool.id).await?;
        self.store.increment_subpool_spin(subpool.id).await?;
        info!(
            pool_id = %pool.id,
            subpool_id = %subpool.id,
            labels_cleared = cleared,
            "Subpool exhausted; starting a new lap"
        );

        match self.store.next_selectable_number(subpool.id).await? {
            Some(number) => Ok(Some(number)),
            None => Err(AppError::exhausted(format!(
                "Subpool {} of pool {} has no enabled numbers",
                subpool.index, pool.id
            ))),
        }
    }
}
