//! Call-center (Webitel) push client configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the call-center display-number API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebitelConfig {
    /// Base URL, e.g. `https://webitel.example.com/api`.
    pub base_url: String,
    /// Static shared secret sent with every request.
    pub access_token: String,
    /// Header carrying the shared secret.
    #[serde(default = "default_auth_header")]
    pub auth_header: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_auth_header() -> String {
    "X-Webitel-Access".to_string()
}

fn default_timeout() -> u64 {
    25
}
