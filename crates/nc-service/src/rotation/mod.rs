//! Number rotation loop.
//!
//! One call rotates every active pool of a team concurrently: each pool
//! hands out its next number, pushes it to the call center, and closes
//! the usage log of the number it replaces.

mod journal;
mod pool;
pub mod report;
pub mod service;

pub use report::{PoolRotation, RotationOutcome, RotationReport};
pub use service::RotationService;
