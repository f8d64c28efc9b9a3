//! Scheduler, dispatcher, and activation timer configuration.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Settings for the rotation scheduler and the subpool activation timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Whether the scheduler loops run at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// IANA zone that binds schedule start/stop times of day.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Seconds between schedule window evaluations.
    #[serde(default = "default_window_tick")]
    pub window_tick_seconds: u64,
    /// Seconds between dispatcher passes.
    #[serde(default = "default_dispatch_tick")]
    pub dispatch_tick_seconds: u64,
    /// Whether the cron-driven subpool activation cycle is registered.
    #[serde(default = "default_true")]
    pub activation_enabled: bool,
    /// Cron expression (with seconds) for the subpool activation cycle.
    #[serde(default = "default_activation_cron")]
    pub activation_cron: String,
}

impl RotationConfig {
    /// Parse the configured zone.
    pub fn tz(&self) -> Result<Tz, AppError> {
        self.timezone.parse::<Tz>().map_err(|e| {
            AppError::configuration(format!("Invalid rotation.timezone '{}': {e}", self.timezone))
        })
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timezone: default_timezone(),
            window_tick_seconds: default_window_tick(),
            dispatch_tick_seconds: default_dispatch_tick(),
            activation_enabled: true,
            activation_cron: default_activation_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timezone() -> String {
    "Europe/Moscow".to_string()
}

fn default_window_tick() -> u64 {
    9
}

fn default_dispatch_tick() -> u64 {
    10
}

fn default_activation_cron() -> String {
    "0 0 * * * *".to_string()
}
