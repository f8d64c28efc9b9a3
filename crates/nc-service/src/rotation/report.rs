//! Per-pool rotation results.

use serde::Serialize;

use nc_core::error::AppError;
use nc_core::result::AppResult;
use nc_core::types::{NumberId, PoolId, SubPoolId, TeamId};

use crate::report::{aggregate, serialize_error};

/// What happened to one pool during a rotation tick.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RotationOutcome {
    /// A new number went live.
    Rotated {
        /// Subpool it came from.
        subpool_id: SubPoolId,
        /// The number.
        number_id: NumberId,
        /// Its value.
        number: String,
        /// The number it replaced, if any.
        previous: Option<NumberId>,
    },
    /// Nothing to do this tick.
    Skipped {
        /// Why.
        reason: String,
    },
    /// The run was cancelled before the push.
    Cancelled,
    /// The pool could not rotate.
    Failed {
        /// The error.
        #[serde(serialize_with = "serialize_error")]
        error: AppError,
    },
}

impl RotationOutcome {
    pub(crate) fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }
}

/// One pool's entry in a [`RotationReport`].
#[derive(Debug, Clone, Serialize)]
pub struct PoolRotation {
    /// The pool.
    pub pool_id: PoolId,
    /// What happened to it.
    #[serde(flatten)]
    pub outcome: RotationOutcome,
}

/// Result of rotating one team, available after every pool task finished.
#[derive(Debug, Clone, Serialize)]
pub struct RotationReport {
    /// The team.
    pub team_id: TeamId,
    /// One entry per active pool, in pool id order.
    pub pools: Vec<PoolRotation>,
}

impl RotationReport {
    /// Pools that got a new number.
    pub fn rotated(&self) -> usize {
        self.count(|o| matches!(o, RotationOutcome::Rotated { .. }))
    }

    /// Pools that failed.
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RotationOutcome::Failed { .. }))
    }

    /// Pools abandoned through cancellation.
    pub fn cancelled(&self) -> usize {
        self.count(|o| matches!(o, RotationOutcome::Cancelled))
    }

    /// Outcome of one pool.
    pub fn outcome(&self, pool_id: PoolId) -> Option<&RotationOutcome> {
        self.pools
            .iter()
            .find(|p| p.pool_id == pool_id)
            .map(|p| &p.outcome)
    }

    /// Every failure folded into one error.
    pub fn into_result(self) -> AppResult<Self> {
        aggregate(self.pools.iter().filter_map(|p| match &p.outcome {
            RotationOutcome::Failed { error } => Some((p.pool_id, error)),
            _ => None,
        }))?;
        Ok(self)
    }

    fn count(&self, pred: impl Fn(&RotationOutcome) -> bool) -> usize {
        self.pools.iter().filter(|p| pred(&p.outcome)).count()
    }
}
