//! Wiring of every engine service over one store and the two clients.

use std::sync::Arc;

use nc_client::{DisplayPusher, VendorControl};
use nc_database::RotationStore;

use crate::activation::SubPoolActivator;
use crate::actuality::ActualityService;
use crate::builder::PoolBuilder;
use crate::numbers::NumberService;
use crate::pools::PoolService;
use crate::redistribution::Redistributor;
use crate::rotation::RotationService;
use crate::schedules::ScheduleService;

/// Every engine service, sharing one store.
#[derive(Clone)]
pub struct Services {
    /// Backing store.
    pub store: Arc<dyn RotationStore>,
    /// Vendor actuality.
    pub actuality: ActualityService,
    /// Subpool activation cycle.
    pub activator: SubPoolActivator,
    /// Number rotation loop.
    pub rotation: RotationService,
    /// Pool builder.
    pub builder: PoolBuilder,
    /// Pool queries and deletion.
    pub pools: PoolService,
    /// Number redistribution.
    pub redistributor: Redistributor,
    /// Number include/exclude.
    pub numbers: NumberService,
    /// Schedule management.
    pub schedules: ScheduleService,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish()
    }
}

impl Services {
    /// Build every service.
    pub fn new(
        store: Arc<dyn RotationStore>,
        pusher: Arc<dyn DisplayPusher>,
        control: Arc<dyn VendorControl>,
    ) -> Self {
        let actuality = ActualityService::new(Arc::clone(&store), control);
        Self {
            activator: SubPoolActivator::new(Arc::clone(&store), actuality.clone()),
            rotation: RotationService::new(Arc::clone(&store), pusher, actuality.clone()),
            builder: PoolBuilder::new(Arc::clone(&store)),
            pools: PoolService::new(Arc::clone(&store)),
            redistributor: Redistributor::new(Arc::clone(&store)),
            numbers: NumberService::new(Arc::clone(&store)),
            schedules: ScheduleService::new(Arc::clone(&store)),
            actuality,
            store,
        }
    }
}
