//! # nc-service
//!
//! The rotation engine. Each service holds its collaborators behind `Arc`
//! and is written against [`nc_database::RotationStore`] and the client
//! traits of `nc-client`, so the same code runs over Postgres in
//! production and over the in-memory store in tests.

pub mod activation;
pub mod actuality;
pub mod builder;
pub mod numbers;
pub mod pools;
pub mod redistribution;
pub mod report;
pub mod rotation;
pub mod schedules;
pub mod services;

#[cfg(test)]
pub(crate) mod fixtures;

pub use activation::{ActivationOutcome, ActivationReport, PoolActivation, SubPoolActivator};
pub use actuality::{ActualityService, SyncSummary};
pub use builder::{BuildPoolRequest, BuiltPool, PoolBuilder};
pub use numbers::NumberService;
pub use pools::PoolService;
pub use redistribution::{MoveRequest, MoveSummary, Redistributor};
pub use rotation::{RotationOutcome, RotationReport, RotationService};
pub use schedules::ScheduleService;
pub use services::Services;
