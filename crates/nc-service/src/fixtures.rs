//! Shared test setup: one vendor, one team mapped to two resources, and
//! every service over an in-memory store with mock clients.

use std::sync::Arc;

use nc_client::mock::{RecordingPusher, StaticVendorControl};
use nc_database::{MemoryStore, RotationStore};
use nc_entity::{NewTeam, NewVendor, ResourceMap, Team, Vendor};

use crate::builder::{BuildPoolRequest, BuiltPool};
use crate::services::Services;

pub(crate) struct Fixture {
    pub store: Arc<MemoryStore>,
    pub pusher: Arc<RecordingPusher>,
    pub control: Arc<StaticVendorControl>,
    pub services: Services,
    pub vendor: Vendor,
    pub team: Team,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let pusher = Arc::new(RecordingPusher::new());
        let control = Arc::new(StaticVendorControl::new());

        let vendor = store
            .create_vendor(&NewVendor {
                name: "vendor-a".into(),
            })
            .await
            .expect("vendor");
        let mut resources = ResourceMap::default();
        resources.insert(vendor.id, vec!["11".into(), "12".into()]);
        let team = store
            .create_team(&NewTeam {
                name: "sales".into(),
                webitel_resource_map: resources,
            })
            .await
            .expect("team");

        let services = Services::new(store.clone(), pusher.clone(), control.clone());
        Self {
            store,
            pusher,
            control,
            services,
            vendor,
            team,
        }
    }

    /// Build a pool of `count` numbers in blocks of `block`.
    pub async fn pool(&self, name: &str, block: i32, count: usize) -> BuiltPool {
        self.services
            .builder
            .build(BuildPoolRequest {
                name: name.to_string(),
                vendor_id: self.vendor.id,
                team_id: self.team.id,
                subpool_block: block,
                numbers: (0..count).map(|i| format!("7900{:07}", i)).collect(),
            })
            .await
            .expect("build pool")
    }
}
