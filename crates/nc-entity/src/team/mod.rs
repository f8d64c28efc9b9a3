//! Team entity and its call-center resource mapping.

pub mod model;
pub mod resources;

pub use model::{NewTeam, Team};
pub use resources::ResourceMap;
