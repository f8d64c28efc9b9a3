//! Call-center (Webitel) display push client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, warn};

use nc_core::config::WebitelConfig;
use nc_core::error::{AppError, ErrorKind};
use nc_core::result::AppResult;

/// Sets the outbound display number of call-center resources.
#[async_trait]
pub trait DisplayPusher: Send + Sync + 'static {
    /// Remove the current display number of a resource.
    async fn clear_display(&self, resource_id: &str) -> AppResult<()>;

    /// Set the display number of a resource.
    async fn set_display(&self, resource_id: &str, number: &str) -> AppResult<()>;

    /// Clear then set `number` on every resource. Stops at the first failure.
    async fn push(&self, resources: &[String], number: &str) -> AppResult<()> {
        for resource_id in resources {
            self.clear_display(resource_id).await?;
            self.set_display(resource_id, number).await?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct DisplayBody<'a> {
    display: &'a str,
}

/// reqwest-backed [`DisplayPusher`].
#[derive(Debug, Clone)]
pub struct WebitelClient {
    http: reqwest::Client,
    base_url: String,
    auth_header: String,
    access_token: String,
}

impl WebitelClient {
    /// Build a client from the `webitel` config section.
    pub fn new(config: &WebitelConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build Webitel client", e)
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_header: config.auth_header.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn display_url(&self, resource_id: &str) -> String {
        format!("{}/call_center/resources/{resource_id}/display", self.base_url)
    }
}

#[async_trait]
impl DisplayPusher for WebitelClient {
    async fn clear_display(&self, resource_id: &str) -> AppResult<()> {
        let response = self
            .http
            .delete(self.display_url(resource_id))
            .header(self.auth_header.as_str(), self.access_token.as_str())
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Webitel clear of resource {resource_id} failed: {e}"),
                    e,
                )
            })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                debug!(resource_id, "No display set on resource");
                Ok(())
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!(resource_id, %status, "Webitel rejected display clear");
                Err(AppError::external(format!(
                    "Webitel clear of resource {resource_id} returned {status}: {body}"
                )))
            }
        }
    }

    async fn set_display(&self, resource_id: &str, number: &str) -> AppResult<()> {
        let response = self
            .http
            .post(self.display_url(resource_id))
            .header(self.auth_header.as_str(), self.access_token.as_str())
            .json(&DisplayBody { display: number })
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Webitel push to resource {resource_id} failed: {e}"),
                    e,
                )
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(resource_id, number, "Display number pushed");
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        warn!(resource_id, %status, "Webitel rejected display push");
        Err(AppError::external(format!(
            "Webitel push to resource {resource_id} returned {status}: {body}"
        )))
    }
}
