//! # nc-entity
//!
//! Row models for the rotation engine. Every struct in this crate
//! represents a table row or the input needed to create one. Table rows
//! derive `sqlx::FromRow`; everything derives `Serialize`/`Deserialize` so
//! the API can return rows directly.

pub mod log;
pub mod number;
pub mod pool;
pub mod schedule;
pub mod team;
pub mod vendor;

pub use log::{NewUsageLog, UsageLog};
pub use number::{NewNumber, Number};
pub use pool::{NewPool, NewSubPool, Pool, SubPool, SubPoolStatus};
pub use schedule::{NewSchedule, Schedule};
pub use team::{NewTeam, ResourceMap, Team};
pub use vendor::{NewVendor, Vendor};
