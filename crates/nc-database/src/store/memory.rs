//! In-process [`RotationStore`] for tests and local development.
//!
//! Holds every table in one `BTreeMap` per entity behind a single Tokio
//! mutex. Ids are handed out from one counter per table, so they grow
//! monotonically like `BIGSERIAL`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::Mutex;

use nc_core::error::AppError;
use nc_core::result::AppResult;
use nc_core::types::{LogId, NumberId, PoolId, ScheduleId, SubPoolId, TeamId, VendorId};
use nc_entity::{
    NewNumber, NewPool, NewSchedule, NewSubPool, NewTeam, NewUsageLog, NewVendor, Number, Pool,
    Schedule, SubPool, SubPoolStatus, Team, UsageLog, Vendor,
};

use super::RotationStore;

#[derive(Debug, Default)]
struct Sequences {
    vendor: i64,
    team: i64,
    pool: i64,
    subpool: i64,
    number: i64,
    log: i64,
    schedule: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Default)]
struct InnerState {
    seq: Sequences,
    vendors: BTreeMap<VendorId, Vendor>,
    teams: BTreeMap<TeamId, Team>,
    pools: BTreeMap<PoolId, Pool>,
    subpools: BTreeMap<SubPoolId, SubPool>,
    numbers: BTreeMap<NumberId, Number>,
    logs: BTreeMap<LogId, UsageLog>,
    schedules: BTreeMap<ScheduleId, Schedule>,
}

impl InnerState {
    fn pool_mut(&mut self, id: PoolId) -> AppResult<&mut Pool> {
        self.pools
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Pool {id} not found")))
    }

    fn subpool_mut(&mut self, id: SubPoolId) -> AppResult<&mut SubPool> {
        self.subpools
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Subpool {id} not found")))
    }

    fn number_mut(&mut self, id: NumberId) -> AppResult<&mut Number> {
        self.numbers
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Number {id} not found")))
    }

    fn sorted_subpools(&self, pool_id: PoolId) -> Vec<SubPool> {
        let mut rows: Vec<SubPool> = self
            .subpools
            .values()
            .filter(|s| s.pool_id == pool_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.index);
        rows
    }

    fn close_logs<F>(&mut self, matches: F) -> u64
    where
        F: Fn(&UsageLog) -> bool,
    {
        let now = Utc::now();
        let mut closed = 0;
        for log in self.logs.values_mut() {
            if log.end_at.is_none() && matches(log) {
                log.end_at = Some(now);
                closed += 1;
            }
        }
        closed
    }
}

/// Mutex-guarded in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RotationStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn create_vendor(&self, data: &NewVendor) -> AppResult<Vendor> {
        let mut state = self.state.lock().await;
        if state.vendors.values().any(|v| v.name == data.name) {
            return Err(AppError::conflict(format!("Vendor '{}' already exists", data.name)));
        }
        let vendor = Vendor {
            id: VendorId(next(&mut state.seq.vendor)),
            name: data.name.clone(),
            created_at: Utc::now(),
        };
        state.vendors.insert(vendor.id, vendor.clone());
        Ok(vendor)
    }

    async fn find_vendor(&self, id: VendorId) -> AppResult<Option<Vendor>> {
        Ok(self.state.lock().await.vendors.get(&id).cloned())
    }

    async fn create_team(&self, data: &NewTeam) -> AppResult<Team> {
        let mut state = self.state.lock().await;
        if state.teams.values().any(|t| t.name == data.name) {
            return Err(AppError::conflict(format!("Team '{}' already exists", data.name)));
        }
        let team = Team {
            id: TeamId(next(&mut state.seq.team)),
            name: data.name.clone(),
            webitel_resource_map: Json(data.webitel_resource_map.clone()),
            actual_vendor_id: None,
            created_at: Utc::now(),
        };
        state.teams.insert(team.id, team.clone());
        Ok(team)
    }

    async fn find_team(&self, id: TeamId) -> AppResult<Option<Team>> {
        Ok(self.state.lock().await.teams.get(&id).cloned())
    }

    async fn list_teams(&self) -> AppResult<Vec<Team>> {
        Ok(self.state.lock().await.teams.values().cloned().collect())
    }

    async fn set_actual_vendor(
        &self,
        team_id: TeamId,
        vendor_id: Option<VendorId>,
    ) -> AppResult<()> {
        if let Some(team) = self.state.lock().await.teams.get_mut(&team_id) {
            team.actual_vendor_id = vendor_id;
        }
        Ok(())
    }

    async fn create_pool(&self, data: &NewPool) -> AppResult<Pool> {
        let mut state = self.state.lock().await;
        if state.pools.values().any(|p| p.name == data.name) {
            return Err(AppError::conflict(format!("Pool '{}' already exists", data.name)));
        }
        let pool = Pool {
            id: PoolId(next(&mut state.seq.pool)),
            name: data.name.clone(),
            active: true,
            rotation: false,
            finish: false,
            finish_at: None,
            subpool_block: data.subpool_block,
            vendor_id: data.vendor_id,
            team_id: data.team_id,
            num_count: data.num_count,
            subpool_count: data.subpool_count,
            sub_activate: false,
            created_at: Utc::now(),
        };
        state.pools.insert(pool.id, pool.clone());
        Ok(pool)
    }

    async fn find_pool(&self, id: PoolId) -> AppResult<Option<Pool>> {
        Ok(self.state.lock().await.pools.get(&id).cloned())
    }

    async fn pool_name_exists(&self, name: &str) -> AppResult<bool> {
        Ok(self.state.lock().await.pools.values().any(|p| p.name == name))
    }

    async fn list_pools(&self, team_id: Option<TeamId>) -> AppResult<Vec<Pool>> {
        let state = self.state.lock().await;
        Ok(state
            .pools
            .values()
            .filter(|p| team_id.is_none_or(|t| p.team_id == t))
            .cloned()
            .collect())
    }

    async fn list_active_pools(&self, team_id: Option<TeamId>) -> AppResult<Vec<Pool>> {
        let state = self.state.lock().await;
        Ok(state
            .pools
            .values()
            .filter(|p| p.active && team_id.is_none_or(|t| p.team_id == t))
            .cloned()
            .collect())
    }

    async fn begin_subpool_transition(&self, id: PoolId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let pool = state.pool_mut(id)?;
        pool.sub_activate = true;
        pool.rotation = true;
        Ok(())
    }

    async fn end_subpool_transition(&self, id: PoolId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.pool_mut(id)?.sub_activate = false;
        Ok(())
    }

    async fn mark_pool_finished(&self, id: PoolId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let pool = state.pool_mut(id)?;
        pool.finish = true;
        pool.finish_at = Some(Utc::now());
        Ok(())
    }

    async fn refresh_pool_counts(&self, id: PoolId) -> AppResult<Pool> {
        let mut state = self.state.lock().await;
        let num_count = state.numbers.values().filter(|n| n.pool_id == id).count() as i32;
        let subpool_count = state.subpools.values().filter(|s| s.pool_id == id).count() as i32;
        let pool = state.pool_mut(id)?;
        pool.num_count = num_count;
        pool.subpool_count = subpool_count;
        Ok(pool.clone())
    }

    async fn delete_pool(&self, id: PoolId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state.pools.remove(&id).is_none() {
            return Ok(false);
        }
        state.subpools.retain(|_, s| s.pool_id != id);
        state.numbers.retain(|_, n| n.pool_id != id);
        state.logs.retain(|_, l| l.pool_id != id);
        Ok(true)
    }

    async fn create_subpool(&self, data: &NewSubPool) -> AppResult<SubPool> {
        let mut state = self.state.lock().await;
        if state
            .subpools
            .values()
            .any(|s| s.pool_id == data.pool_id && s.index == data.index)
        {
            return Err(AppError::conflict(format!(
                "Subpool {} already exists in pool {}",
                data.index, data.pool_id
            )));
        }
        let subpool = SubPool {
            id: SubPoolId(next(&mut state.seq.subpool)),
            pool_id: data.pool_id,
            index: data.index,
            status: SubPoolStatus::Inactive,
            activated_at: None,
            spin: 0,
            last_nid: None,
            last_changed: false,
        };
        state.subpools.insert(subpool.id, subpool.clone());
        Ok(subpool)
    }

    async fn find_subpool(&self, id: SubPoolId) -> AppResult<Option<SubPool>> {
        Ok(self.state.lock().await.subpools.get(&id).cloned())
    }

    async fn list_subpools(&self, pool_id: PoolId) -> AppResult<Vec<SubPool>> {
        Ok(self.state.lock().await.sorted_subpools(pool_id))
    }

    async fn list_subpools_with_status(
        &self,
        pool_id: PoolId,
        status: SubPoolStatus,
    ) -> AppResult<Vec<SubPool>> {
        let mut rows = self.state.lock().await.sorted_subpools(pool_id);
        rows.retain(|s| s.status == status);
        Ok(rows)
    }

    async fn retire_subpool(&self, pool_id: PoolId, id: SubPoolId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        for subpool in state.subpools.values_mut().filter(|s| s.pool_id == pool_id) {
            subpool.last_changed = subpool.id == id;
            if subpool.id == id {
                subpool.status = SubPoolStatus::Used;
                subpool.activated_at.get_or_insert(now);
            }
        }
        Ok(())
    }

    async fn activate_subpool(&self, id: SubPoolId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let subpool = state.subpool_mut(id)?;
        subpool.status = SubPoolStatus::Active;
        subpool.spin += 1;
        subpool.activated_at = Some(Utc::now());
        subpool.last_nid = None;
        Ok(())
    }

    async fn reset_subpools(&self, pool_id: PoolId) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut changed = 0;
        for subpool in state.subpools.values_mut().filter(|s| s.pool_id == pool_id) {
            subpool.status = SubPoolStatus::Inactive;
            changed += 1;
        }
        Ok(changed)
    }

    async fn increment_subpool_spin(&self, id: SubPoolId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.subpool_mut(id)?.spin += 1;
        Ok(())
    }

    async fn set_last_nid(&self, id: SubPoolId, number_id: Option<NumberId>) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.subpool_mut(id)?.last_nid = number_id;
        Ok(())
    }

    async fn max_subpool_index(&self, pool_id: PoolId) -> AppResult<Option<i32>> {
        let state = self.state.lock().await;
        Ok(state
            .subpools
            .values()
            .filter(|s| s.pool_id == pool_id)
            .map(|s| s.index)
            .max())
    }

    async fn create_numbers(&self, data: &[NewNumber]) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        for row in data {
            let number = Number {
                id: NumberId(next(&mut state.seq.number)),
                value: row.value.clone(),
                pool_id: row.pool_id,
                subpool_id: row.subpool_id,
                vendor_id: row.vendor_id,
                team_id: row.team_id,
                spin: 0,
                used: false,
                label: false,
                active: false,
                enabled: true,
                activated_at: None,
            };
            state.numbers.insert(number.id, number);
        }
        Ok(data.len() as u64)
    }

    async fn find_number(&self, id: NumberId) -> AppResult<Option<Number>> {
        Ok(self.state.lock().await.numbers.get(&id).cloned())
    }

    async fn list_numbers(&self, pool_id: PoolId) -> AppResult<Vec<Number>> {
        let state = self.state.lock().await;
        Ok(state
            .numbers
            .values()
            .filter(|n| n.pool_id == pool_id)
            .cloned()
            .collect())
    }

    async fn next_selectable_number(&self, subpool_id: SubPoolId) -> AppResult<Option<Number>> {
        let state = self.state.lock().await;
        Ok(state
            .numbers
            .values()
            .find(|n| n.subpool_id == subpool_id && n.is_selectable())
            .cloned())
    }

    async fn clear_subpool_labels(&self, subpool_id: SubPoolId) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut changed = 0;
        for number in state.numbers.values_mut().filter(|n| n.subpool_id == subpool_id) {
            number.label = false;
            changed += 1;
        }
        Ok(changed)
    }

    async fn clear_pool_labels(&self, pool_id: PoolId) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut changed = 0;
        for number in state.numbers.values_mut().filter(|n| n.pool_id == pool_id) {
            number.label = false;
            changed += 1;
        }
        Ok(changed)
    }

    async fn mark_number_live(&self, id: NumberId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let number = state.number_mut(id)?;
        number.active = true;
        number.label = true;
        number.used = true;
        number.spin += 1;
        number.activated_at = Some(Utc::now());
        Ok(())
    }

    async fn deactivate_number(&self, id: NumberId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.number_mut(id)?.active = false;
        Ok(())
    }

    async fn live_numbers(&self, pool_id: PoolId) -> AppResult<Vec<Number>> {
        let state = self.state.lock().await;
        Ok(state
            .numbers
            .values()
            .filter(|n| n.pool_id == pool_id && n.active)
            .cloned()
            .collect())
    }

    async fn set_numbers_enabled(&self, ids: &[NumberId], enabled: bool) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut changed = 0;
        for id in ids {
            if let Some(number) = state.numbers.get_mut(id) {
                if number.enabled != enabled {
                    number.enabled = enabled;
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    async fn movable_numbers(&self, subpool_id: SubPoolId, limit: i64) -> AppResult<Vec<Number>> {
        let state = self.state.lock().await;
        Ok(state
            .numbers
            .values()
            .filter(|n| n.subpool_id == subpool_id && !n.active)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count_subpool_numbers(&self, subpool_id: SubPoolId) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .numbers
            .values()
            .filter(|n| n.subpool_id == subpool_id)
            .count() as i64)
    }

    async fn move_number(
        &self,
        id: NumberId,
        pool_id: PoolId,
        subpool_id: SubPoolId,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let number = state.number_mut(id)?;
        number.pool_id = pool_id;
        number.subpool_id = subpool_id;
        Ok(())
    }

    async fn open_log(&self, data: &NewUsageLog) -> AppResult<UsageLog> {
        let mut state = self.state.lock().await;
        let log = UsageLog {
            id: LogId(next(&mut state.seq.log)),
            number_id: data.number_id,
            subpool_id: data.subpool_id,
            pool_id: data.pool_id,
            vendor_id: data.vendor_id,
            team_id: data.team_id,
            start_at: Utc::now(),
            end_at: None,
            comment: data.comment.clone(),
        };
        state.logs.insert(log.id, log.clone());
        Ok(log)
    }

    async fn close_number_logs(&self, number_id: NumberId) -> AppResult<u64> {
        Ok(self
            .state
            .lock()
            .await
            .close_logs(|log| log.number_id == number_id))
    }

    async fn close_subpool_logs(&self, subpool_id: SubPoolId) -> AppResult<u64> {
        Ok(self
            .state
            .lock()
            .await
            .close_logs(|log| log.subpool_id == subpool_id))
    }

    async fn count_open_logs(&self, subpool_id: SubPoolId) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .logs
            .values()
            .filter(|l| l.subpool_id == subpool_id && l.is_open())
            .count() as i64)
    }

    async fn list_logs(&self, pool_id: PoolId) -> AppResult<Vec<UsageLog>> {
        let state = self.state.lock().await;
        Ok(state
            .logs
            .values()
            .filter(|l| l.pool_id == pool_id)
            .cloned()
            .collect())
    }

    async fn create_schedule(&self, data: &NewSchedule) -> AppResult<Schedule> {
        let mut state = self.state.lock().await;
        let schedule = Schedule {
            id: ScheduleId(next(&mut state.seq.schedule)),
            name: data.name.clone(),
            start_time: data.start_time,
            stop_time: data.stop_time,
            periodic_sec: data.periodic_sec,
            team_id: data.team_id,
            running: false,
        };
        state.schedules.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    async fn list_schedules(&self) -> AppResult<Vec<Schedule>> {
        Ok(self.state.lock().await.schedules.values().cloned().collect())
    }

    async fn set_schedule_running(&self, id: ScheduleId, running: bool) -> AppResult<()> {
        if let Some(schedule) = self.state.lock().await.schedules.get_mut(&id) {
            schedule.running = running;
        }
        Ok(())
    }

    async fn delete_schedule(&self, id: ScheduleId) -> AppResult<bool> {
        Ok(self.state.lock().await.schedules.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nc_entity::ResourceMap;

    async fn seeded() -> (MemoryStore, Pool, Vec<SubPool>) {
        let store = MemoryStore::new();
        let vendor = store
            .create_vendor(&NewVendor { name: "v".into() })
            .await
            .expect("vendor");
        let team = store
            .create_team(&NewTeam {
                name: "t".into(),
                webitel_resource_map: ResourceMap::default(),
            })
            .await
            .expect("team");
        let pool = store
            .create_pool(&NewPool {
                name: "p".into(),
                subpool_block: 2,
                vendor_id: vendor.id,
                team_id: team.id,
                num_count: 4,
                subpool_count: 2,
            })
            .await
            .expect("pool");
        let mut subpools = Vec::new();
        for index in 0..2 {
            subpools.push(
                store
                    .create_subpool(&NewSubPool {
                        pool_id: pool.id,
                        index,
                    })
                    .await
                    .expect("subpool"),
            );
        }
        let numbers: Vec<NewNumber> = (0..4)
            .map(|i| NewNumber {
                value: format!("7900000000{i}"),
                pool_id: pool.id,
                subpool_id: subpools[i / 2].id,
                vendor_id: vendor.id,
                team_id: team.id,
            })
            .collect();
        store.create_numbers(&numbers).await.expect("numbers");
        (store, pool, subpools)
    }

    #[tokio::test]
    async fn test_retire_flags_only_one_sibling() {
        let (store, pool, subpools) = seeded().await;
        store.retire_subpool(pool.id, subpools[0].id).await.expect("retire");
        store.retire_subpool(pool.id, subpools[1].id).await.expect("retire");

        let rows = store.list_subpools(pool.id).await.expect("list");
        assert_eq!(rows[0].status, SubPoolStatus::Used);
        assert!(!rows[0].last_changed);
        assert!(rows[1].last_changed);
        assert!(rows[1].activated_at.is_some());
    }

    #[tokio::test]
    async fn test_next_selectable_skips_labelled_and_excluded() {
        let (store, _pool, subpools) = seeded().await;
        let first = store
            .next_selectable_number(subpools[0].id)
            .await
            .expect("query")
            .expect("some");
        store.mark_number_live(first.id).await.expect("live");

        let second = store
            .next_selectable_number(subpools[0].id)
            .await
            .expect("query")
            .expect("some");
        assert!(second.id > first.id);

        store.set_numbers_enabled(&[second.id], false).await.expect("exclude");
        assert!(
            store
                .next_selectable_number(subpools[0].id)
                .await
                .expect("query")
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_pool_cascades() {
        let (store, pool, subpools) = seeded().await;
        let number = store
            .next_selectable_number(subpools[0].id)
            .await
            .expect("query")
            .expect("some");
        store
            .open_log(&NewUsageLog {
                number_id: number.id,
                subpool_id: subpools[0].id,
                pool_id: pool.id,
                vendor_id: pool.vendor_id,
                team_id: pool.team_id,
                comment: None,
            })
            .await
            .expect("log");

        assert!(store.delete_pool(pool.id).await.expect("delete"));
        assert!(store.list_subpools(pool.id).await.expect("list").is_empty());
        assert!(store.list_numbers(pool.id).await.expect("list").is_empty());
        assert!(store.list_logs(pool.id).await.expect("list").is_empty());
        assert!(!store.delete_pool(pool.id).await.expect("delete"));
    }

    #[tokio::test]
    async fn test_close_logs_counts_only_open_rows() {
        let (store, pool, subpools) = seeded().await;
        let numbers = store.list_numbers(pool.id).await.expect("list");
        for number in numbers.iter().take(2) {
            store
                .open_log(&NewUsageLog {
                    number_id: number.id,
                    subpool_id: subpools[0].id,
                    pool_id: pool.id,
                    vendor_id: pool.vendor_id,
                    team_id: pool.team_id,
                    comment: None,
                })
                .await
                .expect("log");
        }
        assert_eq!(store.count_open_logs(subpools[0].id).await.expect("count"), 2);
        assert_eq!(store.close_number_logs(numbers[0].id).await.expect("close"), 1);
        assert_eq!(store.close_subpool_logs(subpools[0].id).await.expect("close"), 1);
        assert_eq!(store.count_open_logs(subpools[0].id).await.expect("count"), 0);
    }
}
