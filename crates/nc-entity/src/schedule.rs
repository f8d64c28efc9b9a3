//! Rotation schedule entity.

use chrono::NaiveTime;
use nc_core::types::{ScheduleId, TeamId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A per-team time-of-day window during which numbers rotate every
/// `periodic_sec` seconds.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Schedule {
    /// Schedule identifier.
    pub id: ScheduleId,
    /// Display name.
    pub name: String,
    /// Window start, time of day in the configured zone.
    pub start_time: NaiveTime,
    /// Window stop, time of day in the configured zone.
    pub stop_time: NaiveTime,
    /// Rotation period in seconds.
    pub periodic_sec: i32,
    /// Team the window applies to.
    pub team_id: TeamId,
    /// Whether the window is currently open.
    pub running: bool,
}

/// Data required to create a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSchedule {
    /// Display name.
    pub name: String,
    /// Window start.
    pub start_time: NaiveTime,
    /// Window stop.
    pub stop_time: NaiveTime,
    /// Rotation period in seconds.
    pub periodic_sec: i32,
    /// Team.
    pub team_id: TeamId,
}
