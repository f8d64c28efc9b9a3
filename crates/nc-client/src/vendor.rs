//! Vendor-control client: which vendor is live for a team's group.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use nc_core::config::VendorControlConfig;
use nc_core::error::{AppError, ErrorKind};
use nc_core::result::AppResult;
use nc_core::types::VendorId;

/// One entry of the vendor-control resource list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveResource {
    /// Call-center resource id.
    pub resource_id: String,
    /// Vendor the resource currently dials through.
    pub vendor_id: VendorId,
    /// Whether the resource is carrying traffic.
    pub active: bool,
}

/// Source of truth for vendor actuality.
#[async_trait]
pub trait VendorControl: Send + Sync + 'static {
    /// Active resources of a group; inactive entries are dropped.
    async fn active_resources(&self, group: &str) -> AppResult<Vec<ActiveResource>>;
}

/// reqwest-backed [`VendorControl`].
#[derive(Debug, Clone)]
pub struct VendorControlClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl VendorControlClient {
    /// Build a client from the `vendor_control` config section.
    pub fn new(config: &VendorControlConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build vendor-control client",
                    e,
                )
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl VendorControl for VendorControlClient {
    async fn active_resources(&self, group: &str) -> AppResult<Vec<ActiveResource>> {
        let url = format!("{}/api/groups/{group}/resources", self.base_url);
        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Vendor-control request for group '{group}' failed: {e}"),
                e,
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external(format!(
                "Vendor-control returned {status} for group '{group}'"
            )));
        }

        let entries: Vec<ActiveResource> = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Invalid vendor-control payload for group '{group}': {e}"),
                e,
            )
        })?;

        let active: Vec<ActiveResource> = entries.into_iter().filter(|r| r.active).collect();
        debug!(group, active = active.len(), "Vendor-control resources fetched");
        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, token: Option<&str>) -> VendorControlClient {
        VendorControlClient::new(&VendorControlConfig {
            base_url: server.uri(),
            token: token.map(str::to_string),
            timeout_seconds: 3,
            sync_enabled: true,
            sync_cron: "0 * * * * *".into(),
        })
        .expect("client")
    }

    #[tokio::test]
    async fn test_only_active_entries_are_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/groups/sales/resources"))
            .and(header("Authorization", "Bearer vc-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"resource_id": "11", "vendor_id": 2, "active": false},
                {"resource_id": "12", "vendor_id": 3, "active": true}
            ])))
            .mount(&server)
            .await;

        let resources = client(&server, Some("vc-token"))
            .active_resources("sales")
            .await
            .expect("fetch");
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].vendor_id, VendorId(3));
    }

    #[tokio::test]
    async fn test_server_error_is_external() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server, None)
            .active_resources("sales")
            .await
            .expect_err("should fail");
        assert_eq!(err.kind, ErrorKind::ExternalService);
    }
}
