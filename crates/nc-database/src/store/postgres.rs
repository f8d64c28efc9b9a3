//! [`RotationStore`] over PostgreSQL repositories.

use async_trait::async_trait;
use sqlx::PgPool;

use nc_core::error::{AppError, ErrorKind};
use nc_core::result::AppResult;
use nc_core::types::{NumberId, PoolId, ScheduleId, SubPoolId, TeamId, VendorId};
use nc_entity::{
    NewNumber, NewPool, NewSchedule, NewSubPool, NewTeam, NewUsageLog, NewVendor, Number, Pool,
    Schedule, SubPool, SubPoolStatus, Team, UsageLog, Vendor,
};

use super::RotationStore;
use crate::repositories::{
    NumberRepository, PoolRepository, ScheduleRepository, SubPoolRepository, TeamRepository,
    UsageLogRepository, VendorRepository,
};

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    db: PgPool,
    vendors: VendorRepository,
    teams: TeamRepository,
    pools: PoolRepository,
    subpools: SubPoolRepository,
    numbers: NumberRepository,
    logs: UsageLogRepository,
    schedules: ScheduleRepository,
}

impl PgStore {
    /// Build every repository over one pool.
    pub fn new(db: PgPool) -> Self {
        Self {
            vendors: VendorRepository::new(db.clone()),
            teams: TeamRepository::new(db.clone()),
            pools: PoolRepository::new(db.clone()),
            subpools: SubPoolRepository::new(db.clone()),
            numbers: NumberRepository::new(db.clone()),
            logs: UsageLogRepository::new(db.clone()),
            schedules: ScheduleRepository::new(db.clone()),
            db,
        }
    }
}

#[async_trait]
impl RotationStore for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.db)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))?;
        Ok(())
    }

    async fn create_vendor(&self, data: &NewVendor) -> AppResult<Vendor> {
        self.vendors.create(data).await
    }

    async fn find_vendor(&self, id: VendorId) -> AppResult<Option<Vendor>> {
        self.vendors.find_by_id(id).await
    }

    async fn create_team(&self, data: &NewTeam) -> AppResult<Team> {
        self.teams.create(data).await
    }

    async fn find_team(&self, id: TeamId) -> AppResult<Option<Team>> {
        self.teams.find_by_id(id).await
    }

    async fn list_teams(&self) -> AppResult<Vec<Team>> {
        self.teams.find_all().await
    }

    async fn set_actual_vendor(
        &self,
        team_id: TeamId,
        vendor_id: Option<VendorId>,
    ) -> AppResult<()> {
        self.teams.set_actual_vendor(team_id, vendor_id).await
    }

    async fn create_pool(&self, data: &NewPool) -> AppResult<Pool> {
        self.pools.create(data).await
    }

    async fn find_pool(&self, id: PoolId) -> AppResult<Option<Pool>> {
        self.pools.find_by_id(id).await
    }

    async fn pool_name_exists(&self, name: &str) -> AppResult<bool> {
        self.pools.name_exists(name).await
    }

    async fn list_pools(&self, team_id: Option<TeamId>) -> AppResult<Vec<Pool>> {
        self.pools.find_all(team_id).await
    }

    async fn list_active_pools(&self, team_id: Option<TeamId>) -> AppResult<Vec<Pool>> {
        self.pools.find_active(team_id).await
    }

    async fn begin_subpool_transition(&self, id: PoolId) -> AppResult<()> {
        self.pools.begin_transition(id).await
    }

    async fn end_subpool_transition(&self, id: PoolId) -> AppResult<()> {
        self.pools.end_transition(id).await
    }

    async fn mark_pool_finished(&self, id: PoolId) -> AppResult<()> {
        self.pools.mark_finished(id).await
    }

    async fn refresh_pool_counts(&self, id: PoolId) -> AppResult<Pool> {
        self.pools.refresh_counts(id).await
    }

    async fn delete_pool(&self, id: PoolId) -> AppResult<bool> {
        self.pools.delete(id).await
    }

    async fn create_subpool(&self, data: &NewSubPool) -> AppResult<SubPool> {
        self.subpools.create(data).await
    }

    async fn find_subpool(&self, id: SubPoolId) -> AppResult<Option<SubPool>> {
        self.subpools.find_by_id(id).await
    }

    async fn list_subpools(&self, pool_id: PoolId) -> AppResult<Vec<SubPool>> {
        self.subpools.find_by_pool(pool_id).await
    }

    async fn list_subpools_with_status(
        &self,
        pool_id: PoolId,
        status: SubPoolStatus,
    ) -> AppResult<Vec<SubPool>> {
        self.subpools.find_by_status(pool_id, status).await
    }

    async fn retire_subpool(&self, pool_id: PoolId, id: SubPoolId) -> AppResult<()> {
        self.subpools.retire(pool_id, id).await
    }

    async fn activate_subpool(&self, id: SubPoolId) -> AppResult<()> {
        self.subpools.activate(id).await
    }

    async fn reset_subpools(&self, pool_id: PoolId) -> AppResult<u64> {
        self.subpools.reset_all(pool_id).await
    }

    async fn increment_subpool_spin(&self, id: SubPoolId) -> AppResult<()> {
        self.subpools.increment_spin(id).await
    }

    async fn set_last_nid(&self, id: SubPoolId, number_id: Option<NumberId>) -> AppResult<()> {
        self.subpools.set_last_nid(id, number_id).await
    }

    async fn max_subpool_index(&self, pool_id: PoolId) -> AppResult<Option<i32>> {
        self.subpools.max_index(pool_id).await
    }

    async fn create_numbers(&self, data: &[NewNumber]) -> AppResult<u64> {
        self.numbers.create_batch(data).await
    }

    async fn find_number(&self, id: NumberId) -> AppResult<Option<Number>> {
        self.numbers.find_by_id(id).await
    }

    async fn list_numbers(&self, pool_id: PoolId) -> AppResult<Vec<Number>> {
        self.numbers.find_by_pool(pool_id).await
    }

    async fn next_selectable_number(&self, subpool_id: SubPoolId) -> AppResult<Option<Number>> {
        self.numbers.next_selectable(subpool_id).await
    }

    async fn clear_subpool_labels(&self, subpool_id: SubPoolId) -> AppResult<u64> {
        self.numbers.clear_labels_in_subpool(subpool_id).await
    }

    async fn clear_pool_labels(&self, pool_id: PoolId) -> AppResult<u64> {
        self.numbers.clear_labels_in_pool(pool_id).await
    }

    async fn mark_number_live(&self, id: NumberId) -> AppResult<()> {
        self.numbers.mark_live(id).await
    }

    async fn deactivate_number(&self, id: NumberId) -> AppResult<()> {
        self.numbers.deactivate(id).await
    }

    async fn live_numbers(&self, pool_id: PoolId) -> AppResult<Vec<Number>> {
        self.numbers.find_live_in_pool(pool_id).await
    }

    async fn set_numbers_enabled(&self, ids: &[NumberId], enabled: bool) -> AppResult<u64> {
        self.numbers.set_enabled(ids, enabled).await
    }

    async fn movable_numbers(&self, subpool_id: SubPoolId, limit: i64) -> AppResult<Vec<Number>> {
        self.numbers.find_movable(subpool_id, limit).await
    }

    async fn count_subpool_numbers(&self, subpool_id: SubPoolId) -> AppResult<i64> {
        self.numbers.count_in_subpool(subpool_id).await
    }

    async fn move_number(
        &self,
        id: NumberId,
        pool_id: PoolId,
        subpool_id: SubPoolId,
    ) -> AppResult<()> {
        self.numbers.move_to(id, pool_id, subpool_id).await
    }

    async fn open_log(&self, data: &NewUsageLog) -> AppResult<UsageLog> {
        self.logs.open(data).await
    }

    async fn close_number_logs(&self, number_id: NumberId) -> AppResult<u64> {
        self.logs.close_for_number(number_id).await
    }

    async fn close_subpool_logs(&self, subpool_id: SubPoolId) -> AppResult<u64> {
        self.logs.close_for_subpool(subpool_id).await
    }

    async fn count_open_logs(&self, subpool_id: SubPoolId) -> AppResult<i64> {
        self.logs.count_open(subpool_id).await
    }

    async fn list_logs(&self, pool_id: PoolId) -> AppResult<Vec<UsageLog>> {
        self.logs.find_by_pool(pool_id).await
    }

    async fn create_schedule(&self, data: &NewSchedule) -> AppResult<Schedule> {
        self.schedules.create(data).await
    }

    async fn list_schedules(&self) -> AppResult<Vec<Schedule>> {
        self.schedules.find_all().await
    }

    async fn set_schedule_running(&self, id: ScheduleId, running: bool) -> AppResult<()> {
        self.schedules.set_running(id, running).await
    }

    async fn delete_schedule(&self, id: ScheduleId) -> AppResult<bool> {
        self.schedules.delete(id).await
    }
}
