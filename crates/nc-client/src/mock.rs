//! In-process doubles for the HTTP collaborators, used by tests and by
//! local runs without a call center.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::info;

use nc_core::error::AppError;
use nc_core::result::AppResult;

use crate::vendor::{ActiveResource, VendorControl};
use crate::webitel::DisplayPusher;

/// Pusher that records every display it was asked to set.
#[derive(Debug, Default)]
pub struct RecordingPusher {
    displays: Mutex<Vec<(String, String)>>,
    failing: AtomicBool,
}

impl RecordingPusher {
    /// Create a pusher that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// `(resource_id, number)` pairs set so far, in order.
    pub fn displays(&self) -> Vec<(String, String)> {
        self.displays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn check(&self, resource_id: &str) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::external(format!(
                "Simulated push failure on resource {resource_id}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DisplayPusher for RecordingPusher {
    async fn clear_display(&self, resource_id: &str) -> AppResult<()> {
        self.check(resource_id)
    }

    async fn set_display(&self, resource_id: &str, number: &str) -> AppResult<()> {
        self.check(resource_id)?;
        info!(resource_id, number, "[MockPusher] Display set");
        self.displays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((resource_id.to_string(), number.to_string()));
        Ok(())
    }
}

/// Vendor control answering from a configurable table.
///
/// Unknown groups answer with an empty list.
#[derive(Debug, Default)]
pub struct StaticVendorControl {
    groups: Mutex<HashMap<String, Vec<ActiveResource>>>,
    unreachable: AtomicBool,
}

impl StaticVendorControl {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resources returned for a group.
    pub fn set_group(&self, group: &str, resources: Vec<ActiveResource>) {
        self.groups
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(group.to_string(), resources);
    }

    /// Simulate a transport failure on every call.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }
}

#[async_trait]
impl VendorControl for StaticVendorControl {
    async fn active_resources(&self, group: &str) -> AppResult<Vec<ActiveResource>> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(AppError::external("Simulated vendor-control outage"));
        }
        let groups = self.groups.lock().unwrap_or_else(|e| e.into_inner());
        Ok(groups
            .get(group)
            .map(|list| list.iter().filter(|r| r.active).cloned().collect())
            .unwrap_or_default())
    }
}
