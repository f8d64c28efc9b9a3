//! Background timers for the rotation service.
//!
//! This crate provides:
//! - Schedule window evaluation in the configured zone
//! - A dispatcher that starts one cancellable rotation per running team
//! - Cron jobs for the subpool activation cycle and vendor actuality sync

pub mod cron;
pub mod registry;
pub mod scheduler;
pub mod window;

pub use cron::CronScheduler;
pub use registry::TeamRunRegistry;
pub use scheduler::RotationScheduler;
