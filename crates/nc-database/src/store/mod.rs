//! Storage contract used by the rotation engine.
//!
//! Every mutation is a single targeted update so the Postgres
//! implementation maps each call onto one statement. Nothing here is
//! transactional across calls; callers that need several writes accept
//! that earlier writes stay in place when a later one fails.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use nc_core::result::AppResult;
use nc_core::types::{NumberId, PoolId, ScheduleId, SubPoolId, TeamId, VendorId};
use nc_entity::{
    NewNumber, NewPool, NewSchedule, NewSubPool, NewTeam, NewUsageLog, NewVendor, Number, Pool,
    Schedule, SubPool, SubPoolStatus, Team, UsageLog, Vendor,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence operations needed by the builder, activation cycle,
/// rotation loop, scheduler and redistribution.
#[async_trait]
pub trait RotationStore: Send + Sync + 'static {
    /// Check that the backing store answers.
    async fn ping(&self) -> AppResult<()>;

    // -- vendors --

    /// Register a vendor.
    async fn create_vendor(&self, data: &NewVendor) -> AppResult<Vendor>;
    /// Find a vendor by id.
    async fn find_vendor(&self, id: VendorId) -> AppResult<Option<Vendor>>;

    // -- teams --

    /// Create a team.
    async fn create_team(&self, data: &NewTeam) -> AppResult<Team>;
    /// Find a team by id.
    async fn find_team(&self, id: TeamId) -> AppResult<Option<Team>>;
    /// List all teams ordered by id.
    async fn list_teams(&self) -> AppResult<Vec<Team>>;
    /// Record which vendor currently carries the team's traffic.
    async fn set_actual_vendor(&self, team_id: TeamId, vendor_id: Option<VendorId>)
    -> AppResult<()>;

    // -- pools --

    /// Create a pool (`active = true`, all flags cleared).
    async fn create_pool(&self, data: &NewPool) -> AppResult<Pool>;
    /// Find a pool by id.
    async fn find_pool(&self, id: PoolId) -> AppResult<Option<Pool>>;
    /// Whether a pool with this exact name exists.
    async fn pool_name_exists(&self, name: &str) -> AppResult<bool>;
    /// List pools ordered by id, optionally for one team.
    async fn list_pools(&self, team_id: Option<TeamId>) -> AppResult<Vec<Pool>>;
    /// List active pools ordered by id, optionally for one team.
    async fn list_active_pools(&self, team_id: Option<TeamId>) -> AppResult<Vec<Pool>>;
    /// Set `sub_activate` and `rotation` before a subpool transition.
    async fn begin_subpool_transition(&self, id: PoolId) -> AppResult<()>;
    /// Clear `sub_activate` after a subpool transition.
    async fn end_subpool_transition(&self, id: PoolId) -> AppResult<()>;
    /// Mark a full lap: `finish = true`, `finish_at = now`.
    async fn mark_pool_finished(&self, id: PoolId) -> AppResult<()>;
    /// Recompute `num_count` and `subpool_count` from the stored rows.
    async fn refresh_pool_counts(&self, id: PoolId) -> AppResult<Pool>;
    /// Delete a pool with its subpools, numbers and logs.
    async fn delete_pool(&self, id: PoolId) -> AppResult<bool>;

    // -- subpools --

    /// Create a subpool with `status = inactive`.
    async fn create_subpool(&self, data: &NewSubPool) -> AppResult<SubPool>;
    /// Find a subpool by id.
    async fn find_subpool(&self, id: SubPoolId) -> AppResult<Option<SubPool>>;
    /// List a pool's subpools ordered by index.
    async fn list_subpools(&self, pool_id: PoolId) -> AppResult<Vec<SubPool>>;
    /// List a pool's subpools with the given status, ordered by index.
    async fn list_subpools_with_status(
        &self,
        pool_id: PoolId,
        status: SubPoolStatus,
    ) -> AppResult<Vec<SubPool>>;
    /// Move a subpool to `used`: stamp `activated_at` when unset, clear
    /// `last_changed` on its siblings and set it on this one.
    async fn retire_subpool(&self, pool_id: PoolId, id: SubPoolId) -> AppResult<()>;
    /// Move a subpool to `active`: `spin += 1`, `activated_at = now`,
    /// `last_nid` cleared.
    async fn activate_subpool(&self, id: SubPoolId) -> AppResult<()>;
    /// Set every subpool of the pool back to `inactive`.
    async fn reset_subpools(&self, pool_id: PoolId) -> AppResult<u64>;
    /// `spin += 1` on a subpool.
    async fn increment_subpool_spin(&self, id: SubPoolId) -> AppResult<()>;
    /// Record the number currently live from a subpool.
    async fn set_last_nid(&self, id: SubPoolId, number_id: Option<NumberId>) -> AppResult<()>;
    /// Highest subpool index of the pool, if it has any.
    async fn max_subpool_index(&self, pool_id: PoolId) -> AppResult<Option<i32>>;

    // -- numbers --

    /// Insert numbers in the given order, returning how many were written.
    async fn create_numbers(&self, data: &[NewNumber]) -> AppResult<u64>;
    /// Find a number by id.
    async fn find_number(&self, id: NumberId) -> AppResult<Option<Number>>;
    /// List a pool's numbers ordered by id.
    async fn list_numbers(&self, pool_id: PoolId) -> AppResult<Vec<Number>>;
    /// Smallest-id number of the subpool with `label = false` and `enabled = true`.
    async fn next_selectable_number(&self, subpool_id: SubPoolId) -> AppResult<Option<Number>>;
    /// Clear `label` on every number of a subpool.
    async fn clear_subpool_labels(&self, subpool_id: SubPoolId) -> AppResult<u64>;
    /// Clear `label` on every number of a pool.
    async fn clear_pool_labels(&self, pool_id: PoolId) -> AppResult<u64>;
    /// Make a number live: `active`, `label`, `used`, `spin += 1`, `activated_at = now`.
    async fn mark_number_live(&self, id: NumberId) -> AppResult<()>;
    /// Set `active = false` on a number.
    async fn deactivate_number(&self, id: NumberId) -> AppResult<()>;
    /// Numbers of a pool currently on the air (`active = true`), ordered by id.
    async fn live_numbers(&self, pool_id: PoolId) -> AppResult<Vec<Number>>;
    /// Set `enabled` on the listed numbers; returns how many rows changed.
    async fn set_numbers_enabled(&self, ids: &[NumberId], enabled: bool) -> AppResult<u64>;
    /// Up to `limit` non-live numbers of a subpool, smallest id first.
    async fn movable_numbers(&self, subpool_id: SubPoolId, limit: i64) -> AppResult<Vec<Number>>;
    /// Count the numbers in a subpool.
    async fn count_subpool_numbers(&self, subpool_id: SubPoolId) -> AppResult<i64>;
    /// Reassign a number to another pool and subpool.
    async fn move_number(&self, id: NumberId, pool_id: PoolId, subpool_id: SubPoolId)
    -> AppResult<()>;

    // -- logs --

    /// Open a usage log (`start_at = now`, `end_at = NULL`).
    async fn open_log(&self, data: &NewUsageLog) -> AppResult<UsageLog>;
    /// Close every open log of a number; returns how many were closed.
    async fn close_number_logs(&self, number_id: NumberId) -> AppResult<u64>;
    /// Close every open log of a subpool; returns how many were closed.
    async fn close_subpool_logs(&self, subpool_id: SubPoolId) -> AppResult<u64>;
    /// Count open logs of a subpool.
    async fn count_open_logs(&self, subpool_id: SubPoolId) -> AppResult<i64>;
    /// List a pool's logs ordered by id.
    async fn list_logs(&self, pool_id: PoolId) -> AppResult<Vec<UsageLog>>;

    // -- schedules --

    /// Create a schedule (`running = false`).
    async fn create_schedule(&self, data: &NewSchedule) -> AppResult<Schedule>;
    /// List all schedules ordered by id.
    async fn list_schedules(&self) -> AppResult<Vec<Schedule>>;
    /// Set a schedule's `running` flag.
    async fn set_schedule_running(&self, id: ScheduleId, running: bool) -> AppResult<()>;
    /// Delete a schedule.
    async fn delete_schedule(&self, id: ScheduleId) -> AppResult<bool>;
}
