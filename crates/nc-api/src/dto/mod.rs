//! Request and response bodies.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
