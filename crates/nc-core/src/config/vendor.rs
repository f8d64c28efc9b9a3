//! Vendor-control service configuration.

use serde::{Deserialize, Serialize};

/// Connection and sync settings for the vendor actuality service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorControlConfig {
    /// Base URL of the vendor-control service.
    pub base_url: String,
    /// Optional bearer token.
    #[serde(default)]
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Whether the periodic actuality sync is registered.
    #[serde(default = "default_true")]
    pub sync_enabled: bool,
    /// Cron expression (with seconds) for the periodic actuality sync.
    #[serde(default = "default_sync_cron")]
    pub sync_cron: String,
}

fn default_timeout() -> u64 {
    3
}

fn default_true() -> bool {
    true
}

fn default_sync_cron() -> String {
    "0 * * * * *".to_string()
}
