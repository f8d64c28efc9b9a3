//! # nc-api
//!
//! Administrative HTTP API for the rotation service built on Axum.
//!
//! Exposes pool building and inspection, the activation cycle, manual
//! rotation, number include/exclude and redistribution, schedule
//! management, and configuration reload.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
