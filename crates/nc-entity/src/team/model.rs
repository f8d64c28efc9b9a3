//! Team entity model.

use chrono::{DateTime, Utc};
use nc_core::types::{TeamId, VendorId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use super::resources::ResourceMap;

/// An operator team that dials out with pooled numbers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    /// Team identifier.
    pub id: TeamId,
    /// Team name; also the group name in the vendor-control service.
    pub name: String,
    /// Vendor → call-center resources.
    pub webitel_resource_map: Json<ResourceMap>,
    /// Vendor currently carrying the team's traffic.
    pub actual_vendor_id: Option<VendorId>,
    /// When the team was created.
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Resource ids to push a number of the given vendor to.
    pub fn resources_for(&self, vendor_id: VendorId) -> Vec<String> {
        self.webitel_resource_map.for_vendor(vendor_id)
    }
}

/// Data required to create a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeam {
    /// Team name.
    pub name: String,
    /// Vendor → call-center resources.
    pub webitel_resource_map: ResourceMap,
}
