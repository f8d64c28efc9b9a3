//! # nc-core
//!
//! Core crate for the number rotation service. Contains configuration
//! schemas, typed identifiers, and the unified error system.
//!
//! This crate has **no** internal dependencies on other workspace crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
