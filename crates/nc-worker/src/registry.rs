//! Team id → in-flight rotation bookkeeping.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use nc_core::types::TeamId;

#[derive(Debug)]
struct TeamRun {
    token: CancellationToken,
    last_dispatch: Instant,
    scheduled: bool,
}

/// Cancellation token and last dispatch time of every running team.
///
/// One mutex guards the whole map, so starting a team's rotation and
/// cancelling the previous one happen as a single step.
#[derive(Debug, Clone, Default)]
pub struct TeamRunRegistry {
    runs: Arc<Mutex<HashMap<TeamId, TeamRun>>>,
}

impl TeamRunRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh run for `team_id` if its period has elapsed.
    ///
    /// The previous run's token is cancelled. Returns the new token, or
    /// `None` when the team was dispatched less than `period` ago.
    pub async fn begin(
        &self,
        team_id: TeamId,
        period: Duration,
        now: Instant,
    ) -> Option<CancellationToken> {
        let mut runs = self.runs.lock().await;
        if let Some(run) = runs.get(&team_id) {
            if now.saturating_duration_since(run.last_dispatch) < period {
                return None;
            }
            run.token.cancel();
        }
        let token = CancellationToken::new();
        runs.insert(
            team_id,
            TeamRun {
                token: token.clone(),
                last_dispatch: now,
                scheduled: true,
            },
        );
        Some(token)
    }

    /// Register an operator-triggered run for `team_id`.
    ///
    /// Any run in flight for the team is cancelled first, so a manual and
    /// a scheduled rotation never select from the same subpool at once.
    /// The manual run also restarts the team's period.
    pub async fn begin_manual(&self, team_id: TeamId, now: Instant) -> CancellationToken {
        let mut runs = self.runs.lock().await;
        if let Some(run) = runs.get(&team_id) {
            run.token.cancel();
        }
        let token = CancellationToken::new();
        runs.insert(
            team_id,
            TeamRun {
                token: token.clone(),
                last_dispatch: now,
                scheduled: false,
            },
        );
        token
    }

    /// Drop every team that is not in `running`, cancelling its scheduled
    /// run. Manual runs are left to finish.
    ///
    /// Returns the teams whose scheduled run was cancelled.
    pub async fn retain(&self, running: &HashSet<TeamId>) -> Vec<TeamId> {
        let mut runs = self.runs.lock().await;
        let stopped: Vec<TeamId> = runs
            .keys()
            .filter(|id| !running.contains(id))
            .copied()
            .collect();
        let mut cancelled = Vec::new();
        for team_id in stopped {
            if let Some(run) = runs.remove(&team_id) {
                if run.scheduled {
                    run.token.cancel();
                    cancelled.push(team_id);
                }
            }
        }
        cancelled
    }

    /// Token of a team's current run.
    pub async fn token(&self, team_id: TeamId) -> Option<CancellationToken> {
        self.runs.lock().await.get(&team_id).map(|r| r.token.clone())
    }

    /// Cancel every run and clear the map.
    pub async fn cancel_all(&self) -> usize {
        let mut runs = self.runs.lock().await;
        let count = runs.len();
        for (_, run) in runs.drain() {
            run.token.cancel();
        }
        count
    }

    /// Number of teams with a registered run.
    pub async fn len(&self) -> usize {
        self.runs.lock().await.len()
    }

    /// Whether no team is registered.
    pub async fn is_empty(&self) -> bool {
        self.runs.lock().await.is_empty()
    }
}
