//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use nc_client::mock::{RecordingPusher, StaticVendorControl};
use nc_core::config::{AppConfig, ConfigHandle, ConfigSource};
use nc_database::{MemoryStore, RotationStore};
use nc_entity::{NewTeam, NewVendor, ResourceMap, Team, Vendor};
use nc_service::Services;
use nc_worker::TeamRunRegistry;

const TEST_CONFIG: &str = r#"
[database]
url = "postgres://localhost/nc_test"

[rotation]
timezone = "UTC"

[webitel]
base_url = "http://webitel.test"
access_token = "test-token"

[vendor_control]
base_url = "http://vendor-control.test"
"#;

/// Test application context over the in-memory store and mock clients.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store for direct inspection
    pub store: Arc<MemoryStore>,
    /// Records every display push
    pub pusher: Arc<RecordingPusher>,
    /// Vendor-control answers
    pub control: Arc<StaticVendorControl>,
    /// Engine services sharing the store
    pub services: Services,
    /// Configuration handle
    pub config: ConfigHandle,
    /// Run registry shared with the router
    pub runs: TeamRunRegistry,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let config = ConfigHandle::new(
            AppConfig::from_toml(TEST_CONFIG).expect("Failed to parse test config"),
            ConfigSource::Static,
        );
        let store = Arc::new(MemoryStore::new());
        let pusher = Arc::new(RecordingPusher::new());
        let control = Arc::new(StaticVendorControl::new());
        let services = Services::new(store.clone(), pusher.clone(), control.clone());
        let runs = TeamRunRegistry::new();
        let router = nc_api::build_router(
            nc_api::AppState::new(services.clone(), config.clone()).with_runs(runs.clone()),
        );

        Self {
            router,
            store,
            pusher,
            control,
            services,
            config,
            runs,
        }
    }

    /// Create a vendor and a team whose call-center resources for that
    /// vendor are `resources`.
    pub async fn seed_team(&self, vendor: &str, team: &str, resources: &[&str]) -> (Vendor, Team) {
        let vendor = self
            .store
            .create_vendor(&NewVendor {
                name: vendor.to_string(),
            })
            .await
            .expect("Failed to create vendor");

        let mut map = ResourceMap::default();
        map.insert(vendor.id, resources.iter().map(|r| r.to_string()).collect());
        let team = self
            .store
            .create_team(&NewTeam {
                name: team.to_string(),
                webitel_resource_map: map,
            })
            .await
            .expect("Failed to create team");

        (vendor, team)
    }

    /// `count` distinct numbers starting at `first`.
    pub fn numbers(first: u64, count: u64) -> Vec<String> {
        (first..first + count).map(|n| n.to_string()).collect()
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success body.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}
