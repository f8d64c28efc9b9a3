//! # nc-client
//!
//! Outbound HTTP collaborators of the rotation engine:
//!
//! - [`webitel`]: pushes the live caller-ID onto call-center resources.
//! - [`vendor`]: reads which vendor currently carries a team's traffic.
//!
//! Both sit behind traits so the engine can run against the in-process
//! doubles in [`mock`].

pub mod vendor;
pub mod webitel;

#[cfg(feature = "mock")]
pub mod mock;

pub use vendor::{ActiveResource, VendorControl, VendorControlClient};
pub use webitel::{DisplayPusher, WebitelClient};
