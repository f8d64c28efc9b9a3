//! Pool and subpool entities.

pub mod model;
pub mod status;
pub mod subpool;

pub use model::{NewPool, Pool};
pub use status::SubPoolStatus;
pub use subpool::{NewSubPool, SubPool};
