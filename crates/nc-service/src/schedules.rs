//! Schedule management.

use std::sync::Arc;

use tracing::info;

use nc_core::error::AppError;
use nc_core::result::AppResult;
use nc_core::types::ScheduleId;
use nc_database::RotationStore;
use nc_entity::{NewSchedule, Schedule};

/// Creates, lists and deletes rotation windows.
#[derive(Clone)]
pub struct ScheduleService {
    store: Arc<dyn RotationStore>,
}

impl std::fmt::Debug for ScheduleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleService").finish()
    }
}

impl ScheduleService {
    /// Creates a new schedule service.
    pub fn new(store: Arc<dyn RotationStore>) -> Self {
        Self { store }
    }

    /// List every schedule.
    pub async fn list(&self) -> AppResult<Vec<Schedule>> {
        self.store.list_schedules().await
    }

    /// Create a schedule for an existing team.
    ///
    /// `start_time == stop_time` is accepted and describes a window that
    /// never opens.
    pub async fn create(&self, data: NewSchedule) -> AppResult<Schedule> {
        if data.name.trim().is_empty() {
            return Err(AppError::validation("Schedule name must not be empty"));
        }
        if data.periodic_sec < 1 {
            return Err(AppError::validation("periodic_sec must be at least 1"));
        }
        if self.store.find_team(data.team_id).await?.is_none() {
            return Err(AppError::not_found(format!("Team {} not found", data.team_id)));
        }
        let schedule = self.store.create_schedule(&data).await?;
        info!(
            schedule_id = %schedule.id,
            team_id = %schedule.team_id,
            start = %schedule.start_time,
            stop = %schedule.stop_time,
            periodic_sec = schedule.periodic_sec,
            "Schedule created"
        );
        Ok(schedule)
    }

    /// Delete a schedule.
    pub async fn delete(&self, id: ScheduleId) -> AppResult<()> {
        if !self.store.delete_schedule(id).await? {
            return Err(AppError::not_found(format!("Schedule {id} not found")));
        }
        info!(schedule_id = %id, "Schedule deleted");
        Ok(())
    }
}
