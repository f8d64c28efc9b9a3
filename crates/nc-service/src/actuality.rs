//! Vendor actuality: on-demand gate and periodic synchronisation.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use nc_client::VendorControl;
use nc_core::error::AppError;
use nc_core::result::AppResult;
use nc_core::types::{TeamId, VendorId};
use nc_database::RotationStore;
use nc_entity::Team;

/// Result of one synchronisation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    /// Teams examined.
    pub teams: usize,
    /// Teams whose `actual_vendor_id` changed.
    pub updated: usize,
    /// Teams whose lookup failed.
    pub failed: usize,
}

/// Answers "is this vendor live for this team" and keeps
/// `team.actual_vendor_id` current.
#[derive(Clone)]
pub struct ActualityService {
    store: Arc<dyn RotationStore>,
    control: Arc<dyn VendorControl>,
}

impl std::fmt::Debug for ActualityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActualityService").finish()
    }
}

impl ActualityService {
    /// Creates a new actuality service.
    pub fn new(store: Arc<dyn RotationStore>, control: Arc<dyn VendorControl>) -> Self {
        Self { store, control }
    }

    /// Whether `vendor_id` currently carries the team's traffic.
    ///
    /// An empty answer falls back to the stored `actual_vendor_id` (none
    /// stored counts as actual). A failed lookup counts as actual.
    pub async fn is_actual(&self, team: &Team, vendor_id: VendorId) -> bool {
        match self.control.active_resources(&team.name).await {
            Ok(resources) if !resources.is_empty() => {
                resources.iter().any(|r| r.vendor_id == vendor_id)
            }
            Ok(_) => team.actual_vendor_id.is_none_or(|actual| actual == vendor_id),
            Err(e) => {
                warn!(
                    team_id = %team.id,
                    vendor_id = %vendor_id,
                    error = %e,
                    "Vendor actuality check failed; treating vendor as actual"
                );
                true
            }
        }
    }

    /// [`Self::is_actual`] by team id.
    pub async fn is_vendor_actual(&self, team_id: TeamId, vendor_id: VendorId) -> AppResult<bool> {
        let team = self
            .store
            .find_team(team_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Team {team_id} not found")))?;
        Ok(self.is_actual(&team, vendor_id).await)
    }

    /// Refresh `actual_vendor_id` for one team. Returns whether it changed.
    pub async fn sync_team(&self, team: &Team) -> AppResult<bool> {
        let resources = self.control.active_resources(&team.name).await?;
        let Some(first) = resources.first() else {
            debug!(team_id = %team.id, "No active resources; actual vendor left untouched");
            return Ok(false);
        };
        if team.actual_vendor_id == Some(first.vendor_id) {
            return Ok(false);
        }
        self.store
            .set_actual_vendor(team.id, Some(first.vendor_id))
            .await?;
        info!(
            team_id = %team.id,
            previous = ?team.actual_vendor_id.map(|v| v.get()),
            actual = %first.vendor_id,
            "Team actual vendor changed"
        );
        Ok(true)
    }

    /// Refresh every team. One failing team never stops the others.
    pub async fn sync_all(&self) -> AppResult<SyncSummary> {
        let teams = self.store.list_teams().await?;
        let mut summary = SyncSummary {
            teams: teams.len(),
            ..SyncSummary::default()
        };
        for team in &teams {
            match self.sync_team(team).await {
                Ok(true) => summary.updated += 1,
                Ok(false) => {}
                Err(e) => {
                    summary.failed += 1;
                    warn!(team_id = %team.id, error = %e, "Vendor actuality sync failed");
                }
            }
        }
        Ok(summary)
    }
}
