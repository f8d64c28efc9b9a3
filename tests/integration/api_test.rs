//! Integration tests for the administrative HTTP API.

mod helpers;

use std::time::Duration;

use http::StatusCode;
use serde_json::json;
use tokio::time::Instant;

use helpers::TestApp;
use nc_client::ActiveResource;
use nc_database::RotationStore;

async fn create_pool(app: &TestApp, name: &str, vendor: i64, team: i64, block: i32, count: u64) -> serde_json::Value {
    let response = app
        .request(
            "POST",
            "/api/pools",
            Some(json!({
                "name": name,
                "vendor_id": vendor,
                "team_id": team,
                "subpool_block": block,
                "numbers": TestApp::numbers(79_000_000_000, count),
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.data().clone()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.data()["status"], "ok");
}

#[tokio::test]
async fn test_create_pool_splits_into_subpools() {
    let app = TestApp::new().await;
    let (vendor, team) = app.seed_team("vendor-a", "sales", &["11"]).await;

    let built = create_pool(&app, "spring", vendor.id.get(), team.id.get(), 4, 10).await;
    assert_eq!(built["pool"]["num_count"], 10);
    assert_eq!(built["pool"]["subpool_count"], 3);
    assert_eq!(built["numbers"], 10);
    let indexes: Vec<i64> = built["subpools"]
        .as_array()
        .expect("subpools")
        .iter()
        .map(|s| s["index"].as_i64().expect("index"))
        .collect();
    assert_eq!(indexes, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_duplicate_pool_name_is_suffixed() {
    let app = TestApp::new().await;
    let (vendor, team) = app.seed_team("vendor-a", "sales", &["11"]).await;

    create_pool(&app, "spring", vendor.id.get(), team.id.get(), 4, 4).await;
    let second = create_pool(&app, "spring", vendor.id.get(), team.id.get(), 4, 4).await;
    assert_eq!(second["pool"]["name"], "spring (2)");
}

#[tokio::test]
async fn test_create_pool_validation() {
    let app = TestApp::new().await;
    let (vendor, team) = app.seed_team("vendor-a", "sales", &["11"]).await;

    let response = app
        .request(
            "POST",
            "/api/pools",
            Some(json!({
                "name": "bad",
                "vendor_id": vendor.id.get(),
                "team_id": team.id.get(),
                "subpool_block": 0,
                "numbers": ["1"],
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");

    let response = app
        .request(
            "POST",
            "/api/pools",
            Some(json!({
                "name": "blank",
                "vendor_id": vendor.id.get(),
                "team_id": team.id.get(),
                "subpool_block": 2,
                "numbers": ["  ", ""],
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "CONFIGURATION");
    assert!(app.store.list_pools(None).await.expect("list").is_empty());
}

#[tokio::test]
async fn test_create_pool_unknown_vendor() {
    let app = TestApp::new().await;
    let (_, team) = app.seed_team("vendor-a", "sales", &["11"]).await;

    let response = app
        .request(
            "POST",
            "/api/pools",
            Some(json!({
                "name": "orphan",
                "vendor_id": 999,
                "team_id": team.id.get(),
                "subpool_block": 2,
                "numbers": ["1", "2"],
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_get_and_delete_pool() {
    let app = TestApp::new().await;
    let (vendor, team) = app.seed_team("vendor-a", "sales", &["11"]).await;
    let built = create_pool(&app, "spring", vendor.id.get(), team.id.get(), 2, 4).await;
    let id = built["pool"]["id"].as_i64().expect("id");

    let response = app.request("GET", &format!("/api/pools/{id}"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["name"], "spring");

    let response = app.request("GET", &format!("/api/pools/{id}/subpools"), None).await;
    assert_eq!(response.data().as_array().expect("subpools").len(), 2);

    let response = app.request("DELETE", &format!("/api/pools/{id}"), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", &format!("/api/pools/{id}"), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let response = app.request("DELETE", &format!("/api/pools/{id}"), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_pools_by_team() {
    let app = TestApp::new().await;
    let (vendor, sales) = app.seed_team("vendor-a", "sales", &["11"]).await;
    let support = app
        .store
        .create_team(&nc_entity::NewTeam {
            name: "support".into(),
            webitel_resource_map: Default::default(),
        })
        .await
        .expect("team");
    create_pool(&app, "one", vendor.id.get(), sales.id.get(), 2, 2).await;
    create_pool(&app, "two", vendor.id.get(), support.id.get(), 2, 2).await;

    let all = app.request("GET", "/api/pools", None).await;
    assert_eq!(all.data().as_array().expect("pools").len(), 2);

    let filtered = app
        .request("GET", &format!("/api/pools?team_id={}", support.id), None)
        .await;
    let pools = filtered.data().as_array().expect("pools");
    assert_eq!(pools.len(), 1);
    assert_eq!(pools[0]["name"], "two");
}

#[tokio::test]
async fn test_activate_then_rotate() {
    let app = TestApp::new().await;
    let (vendor, team) = app.seed_team("vendor-a", "sales", &["11", "12"]).await;
    let built = create_pool(&app, "spring", vendor.id.get(), team.id.get(), 4, 10).await;
    let pool_id = built["pool"]["id"].as_i64().expect("id");

    let response = app
        .request("POST", &format!("/api/pools/{pool_id}/subpools/activate"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["outcome"], "activated");
    assert_eq!(response.data()["index"], 0);
    assert_eq!(response.data()["deactivated"], serde_json::Value::Null);

    let response = app
        .request("POST", &format!("/api/teams/{}/rotate", team.id), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let entry = &response.data()["pools"][0];
    assert_eq!(entry["pool_id"], pool_id);
    assert_eq!(entry["outcome"], "rotated");
    assert_eq!(entry["number"], "79000000000");

    assert_eq!(
        app.pusher.displays(),
        vec![
            ("11".to_string(), "79000000000".to_string()),
            ("12".to_string(), "79000000000".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_manual_rotate_supersedes_scheduled_run() {
    let app = TestApp::new().await;
    let (vendor, team) = app.seed_team("vendor-a", "sales", &["11"]).await;
    let built = create_pool(&app, "spring", vendor.id.get(), team.id.get(), 4, 4).await;
    let pool_id = built["pool"]["id"].as_i64().expect("id");
    app.request("POST", &format!("/api/pools/{pool_id}/subpools/activate"), None)
        .await;

    let period = Duration::from_secs(60);
    let scheduled = app
        .runs
        .begin(team.id, period, Instant::now())
        .await
        .expect("first dispatch");

    let response = app
        .request("POST", &format!("/api/teams/{}/rotate", team.id), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["pools"][0]["outcome"], "rotated");

    assert!(scheduled.is_cancelled());
    // the manual run restarted the period
    assert!(app.runs.begin(team.id, period, Instant::now()).await.is_none());
}

#[tokio::test]
async fn test_activate_all_reports_every_pool() {
    let app = TestApp::new().await;
    let (vendor, team) = app.seed_team("vendor-a", "sales", &["11"]).await;
    create_pool(&app, "one", vendor.id.get(), team.id.get(), 2, 4).await;
    create_pool(&app, "two", vendor.id.get(), team.id.get(), 2, 4).await;

    let response = app.request("POST", "/api/subpools/activate", None).await;
    assert_eq!(response.status, StatusCode::OK);
    let pools = response.data()["pools"].as_array().expect("pools");
    assert_eq!(pools.len(), 2);
    assert!(pools.iter().all(|p| p["outcome"] == "activated"));
}

#[tokio::test]
async fn test_rotate_failures_are_reported_per_pool() {
    let app = TestApp::new().await;
    let (vendor, team) = app.seed_team("vendor-a", "sales", &["11"]).await;
    create_pool(&app, "idle", vendor.id.get(), team.id.get(), 2, 4).await;

    let response = app
        .request("POST", &format!("/api/teams/{}/rotate", team.id), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let entry = &response.data()["pools"][0];
    assert_eq!(entry["outcome"], "failed");
    assert!(entry["error"].as_str().expect("error").starts_with("EXHAUSTED"));
}

#[tokio::test]
async fn test_rotate_unknown_team() {
    let app = TestApp::new().await;
    let response = app.request("POST", "/api/teams/404/rotate", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_exclude_and_include_numbers() {
    let app = TestApp::new().await;
    let (vendor, team) = app.seed_team("vendor-a", "sales", &["11"]).await;
    let built = create_pool(&app, "spring", vendor.id.get(), team.id.get(), 4, 4).await;
    let pool_id = nc_core::types::PoolId(built["pool"]["id"].as_i64().expect("id"));
    let ids: Vec<i64> = app
        .store
        .list_numbers(pool_id)
        .await
        .expect("numbers")
        .iter()
        .take(2)
        .map(|n| n.id.get())
        .collect();

    let response = app.request("POST", "/api/numbers/exclude", Some(json!({ "ids": [] }))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request("POST", "/api/numbers/exclude", Some(json!({ "ids": ids })))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["updated"], 2);

    let numbers = app.store.list_numbers(pool_id).await.expect("numbers");
    assert_eq!(numbers.iter().filter(|n| !n.enabled).count(), 2);

    let response = app
        .request("POST", "/api/numbers/include", Some(json!({ "ids": ids })))
        .await;
    assert_eq!(response.data()["updated"], 2);
}

#[tokio::test]
async fn test_move_numbers() {
    let app = TestApp::new().await;
    let (vendor, team) = app.seed_team("vendor-a", "sales", &["11"]).await;
    let src = create_pool(&app, "src", vendor.id.get(), team.id.get(), 4, 8).await;
    let dst = create_pool(&app, "dst", vendor.id.get(), team.id.get(), 4, 4).await;

    let body = json!({
        "count": 2,
        "from_pool": src["pool"]["id"],
        "to_pool": dst["pool"]["id"],
        "team_id": team.id.get(),
        "src_vendor": vendor.id.get(),
        "dst_vendor": vendor.id.get(),
        "src_subpool_count": 2,
        "dst_subpool_count": 1,
    });
    let response = app.request("POST", "/api/numbers/move", Some(body.clone())).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["moved"], 4);

    let src_pool = app.request("GET", &format!("/api/pools/{}", src["pool"]["id"]), None).await;
    let dst_pool = app.request("GET", &format!("/api/pools/{}", dst["pool"]["id"]), None).await;
    assert_eq!(src_pool.data()["num_count"], 4);
    assert_eq!(dst_pool.data()["num_count"], 8);

    let mut mismatch = body.clone();
    mismatch["dst_vendor"] = json!(999);
    let response = app.request("POST", "/api/numbers/move", Some(mismatch)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let mut huge = body;
    huge["count"] = json!(i64::MAX);
    let response = app.request("POST", "/api/numbers/move", Some(huge)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_schedule_crud() {
    let app = TestApp::new().await;
    let (_, team) = app.seed_team("vendor-a", "sales", &["11"]).await;

    let response = app
        .request(
            "POST",
            "/api/schedules",
            Some(json!({
                "name": "office",
                "start_time": "09:00:00",
                "stop_time": "18:00:00",
                "periodic_sec": 0,
                "team_id": team.id.get(),
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "POST",
            "/api/schedules",
            Some(json!({
                "name": "office",
                "start_time": "09:00:00",
                "stop_time": "18:00:00",
                "periodic_sec": 60,
                "team_id": team.id.get(),
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.data()["running"], false);
    let id = response.data()["id"].as_i64().expect("id");

    let response = app.request("GET", "/api/schedules", None).await;
    assert_eq!(response.data().as_array().expect("schedules").len(), 1);

    let response = app.request("DELETE", &format!("/api/schedules/{id}"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app.request("DELETE", &format!("/api/schedules/{id}"), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sync_actuality_updates_team() {
    let app = TestApp::new().await;
    let (vendor, team) = app.seed_team("vendor-a", "sales", &["11"]).await;
    app.control.set_group(
        &team.name,
        vec![ActiveResource {
            resource_id: "11".into(),
            vendor_id: vendor.id,
            active: true,
        }],
    );

    let response = app.request("POST", "/api/teams/sync-actuality", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["teams"], 1);
    assert_eq!(response.data()["updated"], 1);

    let response = app.request("GET", "/api/teams", None).await;
    assert_eq!(response.data()[0]["actual_vendor_id"], vendor.id.get());
}

#[tokio::test]
async fn test_config_reload() {
    let app = TestApp::new().await;
    let response = app.request("POST", "/api/admin/config/reload", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["rotation"]["timezone"], "UTC");
    assert_eq!(app.config.current().rotation.timezone, "UTC");
}
