//! Schedule window evaluator and per-team rotation dispatcher.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use nc_core::config::ConfigHandle;
use nc_core::result::AppResult;
use nc_core::types::TeamId;
use nc_database::RotationStore;
use nc_entity::Schedule;
use nc_service::RotationService;

use crate::registry::TeamRunRegistry;
use crate::window;

/// Drives the two second-granularity loops: schedule windows and dispatch.
#[derive(Clone)]
pub struct RotationScheduler {
    store: Arc<dyn RotationStore>,
    rotation: RotationService,
    config: ConfigHandle,
    registry: TeamRunRegistry,
}

impl std::fmt::Debug for RotationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationScheduler").finish()
    }
}

impl RotationScheduler {
    /// Create a scheduler with an empty team registry.
    pub fn new(
        store: Arc<dyn RotationStore>,
        rotation: RotationService,
        config: ConfigHandle,
    ) -> Self {
        Self {
            store,
            rotation,
            config,
            registry: TeamRunRegistry::new(),
        }
    }

    /// Registry of in-flight team rotations.
    pub fn registry(&self) -> &TeamRunRegistry {
        &self.registry
    }

    /// Flip `running` on every schedule whose window opened or closed.
    ///
    /// Returns the number of schedules that changed.
    pub async fn evaluate_windows(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let tz = self.config.current().rotation.tz()?;
        let mut changed = 0;
        for schedule in self.store.list_schedules().await? {
            let open = window::is_open(&schedule, now, tz);
            if open == schedule.running {
                continue;
            }
            self.store.set_schedule_running(schedule.id, open).await?;
            info!(
                schedule_id = %schedule.id,
                team_id = %schedule.team_id,
                running = open,
                "Schedule window {}",
                if open { "opened" } else { "closed" }
            );
            changed += 1;
        }
        Ok(changed)
    }

    /// Start a rotation for every running team whose period elapsed and
    /// cancel the runs of teams that stopped.
    ///
    /// Returns the teams a rotation was spawned for.
    pub async fn dispatch(&self, now: Instant) -> AppResult<Vec<TeamId>> {
        let periods = running_periods(&self.store.list_schedules().await?);

        let running: HashSet<TeamId> = periods.keys().copied().collect();
        for team_id in self.registry.retain(&running).await {
            info!(team_id = %team_id, "Team left its schedule window; rotation cancelled");
        }

        let mut dispatched = Vec::new();
        for (team_id, period) in periods {
            let Some(token) = self.registry.begin(team_id, period, now).await else {
                continue;
            };
            let rotation = self.rotation.clone();
            tokio::spawn(async move {
                match rotation.rotate_team(team_id, token).await {
                    Ok(report) => {
                        if let Err(e) = report.into_result() {
                            warn!(team_id = %team_id, error = %e, "Team rotation finished with failures");
                        }
                    }
                    Err(e) => error!(team_id = %team_id, error = %e, "Team rotation failed"),
                }
            });
            debug!(team_id = %team_id, period_secs = period.as_secs(), "Team rotation dispatched");
            dispatched.push(team_id);
        }
        Ok(dispatched)
    }

    /// Run both loops until the shutdown signal, then cancel every team.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) {
        info!("Rotation scheduler started");
        futures::future::join(
            self.window_loop(shutdown.clone()),
            self.dispatch_loop(shutdown),
        )
        .await;

        let cancelled = self.registry.cancel_all().await;
        info!(cancelled, "Rotation scheduler shut down");
    }

    async fn window_loop(&self, mut shutdown: watch::Receiver<bool>) {
        loop {
            let config = self.config.current();
            if config.rotation.enabled {
                if let Err(e) = self.evaluate_windows(Utc::now()).await {
                    error!(error = %e, "Schedule window evaluation failed");
                }
            }
            let tick = Duration::from_secs(config.rotation.window_tick_seconds.max(1));
            if wait_or_shutdown(&mut shutdown, tick).await {
                break;
            }
        }
    }

    async fn dispatch_loop(&self, mut shutdown: watch::Receiver<bool>) {
        loop {
            let config = self.config.current();
            if config.rotation.enabled {
                if let Err(e) = self.dispatch(Instant::now()).await {
                    error!(error = %e, "Rotation dispatch failed");
                }
            }
            let tick = Duration::from_secs(config.rotation.dispatch_tick_seconds.max(1));
            if wait_or_shutdown(&mut shutdown, tick).await {
                break;
            }
        }
    }
}

/// Smallest `periodic_sec` (at least one second) among the running rows of
/// each team that has any.
fn running_periods(schedules: &[Schedule]) -> BTreeMap<TeamId, Duration> {
    let mut periods: BTreeMap<TeamId, Duration> = BTreeMap::new();
    for schedule in schedules.iter().filter(|s| s.running) {
        let period = Duration::from_secs(schedule.periodic_sec.max(1) as u64);
        periods
            .entry(schedule.team_id)
            .and_modify(|p| *p = (*p).min(period))
            .or_insert(period);
    }
    periods
}

/// Sleep for `tick`; returns `true` if shutdown was signalled meanwhile.
async fn wait_or_shutdown(shutdown: &mut watch::Receiver<bool>, tick: Duration) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    tokio::select! {
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
        _ = time::sleep(tick) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};
    use nc_client::mock::{RecordingPusher, StaticVendorControl};
    use nc_core::config::{AppConfig, ConfigSource};
    use nc_core::types::ScheduleId;
    use nc_database::MemoryStore;
    use nc_entity::{NewSchedule, NewTeam, ResourceMap};
    use nc_service::Services;

    struct Setup {
        store: Arc<MemoryStore>,
        scheduler: RotationScheduler,
        team_id: TeamId,
    }

    async fn setup() -> Setup {
        let store = Arc::new(MemoryStore::new());
        let services = Services::new(
            store.clone(),
            Arc::new(RecordingPusher::new()),
            Arc::new(StaticVendorControl::new()),
        );
        let team = store
            .create_team(&NewTeam {
                name: "sales".into(),
                webitel_resource_map: ResourceMap::default(),
            })
            .await
            .expect("team");
        let config = AppConfig::from_toml(
            r#"
            [database]
            url = "postgres://localhost/nc"
            [rotation]
            timezone = "UTC"
            [webitel]
            base_url = "http://w"
            access_token = "t"
            [vendor_control]
            base_url = "http://v"
            "#,
        )
        .expect("config");
        let scheduler = RotationScheduler::new(
            store.clone(),
            services.rotation.clone(),
            ConfigHandle::new(config, ConfigSource::Static),
        );
        Setup {
            store,
            scheduler,
            team_id: team.id,
        }
    }

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).expect("valid time")
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, 0, 0).unwrap()
    }

    fn schedule(id: i64, team_id: TeamId, periodic_sec: i32, running: bool) -> Schedule {
        Schedule {
            id: ScheduleId(id),
            name: format!("s{id}"),
            start_time: t(9),
            stop_time: t(18),
            periodic_sec,
            team_id,
            running,
        }
    }

    #[test]
    fn test_running_periods_take_the_smallest() {
        let rows = vec![
            schedule(1, TeamId(1), 60, true),
            schedule(2, TeamId(1), 30, true),
            schedule(3, TeamId(1), 5, false),
            schedule(4, TeamId(2), 0, true),
            schedule(5, TeamId(3), 10, false),
        ];
        let periods = running_periods(&rows);
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[&TeamId(1)], Duration::from_secs(30));
        assert_eq!(periods[&TeamId(2)], Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_window_open_dispatch_then_close_cancels() {
        let s = setup().await;
        s.store
            .create_schedule(&NewSchedule {
                name: "office".into(),
                start_time: t(9),
                stop_time: t(18),
                periodic_sec: 60,
                team_id: s.team_id,
            })
            .await
            .expect("schedule");

        assert_eq!(s.scheduler.evaluate_windows(at(10)).await.expect("eval"), 1);
        assert!(s.store.list_schedules().await.expect("list")[0].running);
        assert_eq!(s.scheduler.evaluate_windows(at(11)).await.expect("eval"), 0);

        let now = Instant::now();
        let dispatched = s.scheduler.dispatch(now).await.expect("dispatch");
        assert_eq!(dispatched, vec![s.team_id]);
        let token = s
            .scheduler
            .registry()
            .token(s.team_id)
            .await
            .expect("registered");

        let again = s
            .scheduler
            .dispatch(now + Duration::from_secs(10))
            .await
            .expect("dispatch");
        assert!(again.is_empty());
        assert!(!token.is_cancelled());

        assert_eq!(s.scheduler.evaluate_windows(at(19)).await.expect("eval"), 1);
        assert!(!s.store.list_schedules().await.expect("list")[0].running);
        let dispatched = s
            .scheduler
            .dispatch(now + Duration::from_secs(20))
            .await
            .expect("dispatch");
        assert!(dispatched.is_empty());
        assert!(token.is_cancelled());
        assert!(s.scheduler.registry().is_empty().await);
    }

    #[tokio::test]
    async fn test_elapsed_period_replaces_previous_run() {
        let s = setup().await;
        s.store
            .create_schedule(&NewSchedule {
                name: "office".into(),
                start_time: t(9),
                stop_time: t(18),
                periodic_sec: 30,
                team_id: s.team_id,
            })
            .await
            .expect("schedule");
        s.scheduler.evaluate_windows(at(10)).await.expect("eval");

        let now = Instant::now();
        s.scheduler.dispatch(now).await.expect("dispatch");
        let first = s.scheduler.registry().token(s.team_id).await.expect("first");

        let dispatched = s
            .scheduler
            .dispatch(now + Duration::from_secs(30))
            .await
            .expect("dispatch");
        assert_eq!(dispatched, vec![s.team_id]);
        assert!(first.is_cancelled());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let s = setup().await;
        let (tx, rx) = watch::channel(false);
        let scheduler = s.scheduler.clone();
        let handle = tokio::spawn(async move { scheduler.run(rx).await });

        tx.send(true).expect("send");
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scheduler stopped")
            .expect("join");
    }
}
