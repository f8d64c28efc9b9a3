//! End-to-end pool lifecycle: build, activate, rotate, wrap, redistribute,
//! and scheduler-driven rotation.

mod helpers;

use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use helpers::TestApp;
use nc_core::types::PoolId;
use nc_database::RotationStore;
use nc_entity::{NewSchedule, SubPoolStatus, Team, Vendor};
use nc_service::{ActivationOutcome, BuildPoolRequest, MoveRequest};
use nc_worker::RotationScheduler;

async fn build(
    app: &TestApp,
    seed: &(Vendor, Team),
    name: &str,
    block: i32,
    first: u64,
    count: u64,
) -> PoolId {
    let (vendor, team) = seed;
    app.services
        .builder
        .build(BuildPoolRequest {
            name: name.to_string(),
            vendor_id: vendor.id,
            team_id: team.id,
            subpool_block: block,
            numbers: TestApp::numbers(first, count),
        })
        .await
        .expect("build pool")
        .pool
        .id
}

#[tokio::test]
async fn test_full_lap_restarts_at_first_subpool() {
    let app = TestApp::new().await;
    let seed = app.seed_team("vendor-a", "sales", &["11"]).await;
    let pool_id = build(&app, &seed, "lap", 2, 79_000_000_000, 4).await;
    let team_id = seed.1.id;

    let mut indexes = Vec::new();
    for _ in 0..2 {
        match app.services.activator.activate_pool(pool_id).await.expect("activate") {
            ActivationOutcome::Activated { index, wrapped, .. } => {
                assert!(!wrapped);
                indexes.push(index);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        let report = app
            .services
            .rotation
            .rotate_team(team_id, CancellationToken::new())
            .await
            .expect("rotate");
        assert_eq!(report.rotated(), 1);
    }
    assert_eq!(indexes, vec![0, 1]);

    let labelled = app.store.list_numbers(pool_id).await.expect("numbers");
    assert_eq!(labelled.iter().filter(|n| n.label).count(), 2);

    match app.services.activator.activate_pool(pool_id).await.expect("activate") {
        ActivationOutcome::Activated { index, wrapped, .. } => {
            assert_eq!(index, 0);
            assert!(wrapped);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let pool = app.store.find_pool(pool_id).await.expect("find").expect("pool");
    assert!(pool.finish);
    assert!(pool.finish_at.is_some());

    let numbers = app.store.list_numbers(pool_id).await.expect("numbers");
    assert!(numbers.iter().all(|n| !n.label));

    let subpools = app.store.list_subpools(pool_id).await.expect("subpools");
    assert_eq!(subpools[0].status, SubPoolStatus::Active);
    assert_eq!(subpools[0].spin, 2);
    assert_eq!(subpools[1].status, SubPoolStatus::Inactive);
}

#[tokio::test]
async fn test_redistribution_conserves_numbers() {
    let app = TestApp::new().await;
    let seed = app.seed_team("vendor-a", "sales", &["11"]).await;
    let src = build(&app, &seed, "src", 3, 79_000_000_000, 9).await;
    let dst = build(&app, &seed, "dst", 2, 79_100_000_000, 2).await;
    let (vendor_id, team_id) = (seed.0.id, seed.1.id);

    let summary = app
        .services
        .redistributor
        .move_numbers(&MoveRequest {
            count: 2,
            from_pool: src,
            to_pool: dst,
            team_id,
            src_vendor: vendor_id,
            dst_vendor: vendor_id,
            src_subpool_count: 3,
            dst_subpool_count: 1,
        })
        .await
        .expect("move");
    // capacity = ceil(2/1) + 2 = 4; six candidates, two fit, four overflow
    assert_eq!(summary.capacity, 4);
    assert_eq!(summary.moved, 6);
    assert_eq!(summary.created_subpools, 1);

    let src_pool = app.store.find_pool(src).await.expect("find").expect("src");
    let dst_pool = app.store.find_pool(dst).await.expect("find").expect("dst");
    assert_eq!(src_pool.num_count, 3);
    assert_eq!(dst_pool.num_count, 8);
    assert_eq!(dst_pool.subpool_count, 2);
    assert_eq!(
        app.store.list_numbers(dst).await.expect("numbers").len()
            + app.store.list_numbers(src).await.expect("numbers").len(),
        11
    );
}

#[tokio::test]
async fn test_scheduler_rotates_team_in_open_window() {
    let app = TestApp::new().await;
    let seed = app.seed_team("vendor-a", "sales", &["11"]).await;
    let pool_id = build(&app, &seed, "live", 4, 79_000_000_000, 4).await;
    let team_id = seed.1.id;
    app.services
        .activator
        .activate_pool(pool_id)
        .await
        .expect("activate");

    let now = Utc::now();
    app.services
        .schedules
        .create(NewSchedule {
            name: "always".into(),
            start_time: (now - chrono::Duration::hours(1)).time(),
            stop_time: (now + chrono::Duration::hours(1)).time(),
            periodic_sec: 60,
            team_id,
        })
        .await
        .expect("schedule");

    let scheduler = RotationScheduler::new(
        app.services.store.clone(),
        app.services.rotation.clone(),
        app.config.clone(),
    );
    assert_eq!(scheduler.evaluate_windows(now).await.expect("windows"), 1);
    assert_eq!(
        scheduler.dispatch(Instant::now()).await.expect("dispatch"),
        vec![team_id]
    );

    let deadline = Instant::now() + Duration::from_secs(5);
    while app.pusher.displays().is_empty() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(
        app.pusher.displays(),
        vec![("11".to_string(), "79000000000".to_string())]
    );

    let subpools = app.store.list_subpools(pool_id).await.expect("subpools");
    let numbers = app.store.list_numbers(pool_id).await.expect("numbers");
    assert_eq!(subpools[0].last_nid, Some(numbers[0].id));
    assert!(numbers[0].active);
}
