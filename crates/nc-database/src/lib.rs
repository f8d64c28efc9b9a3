//! # nc-database
//!
//! PostgreSQL connection management, schema migrations, per-table
//! repositories and the [`RotationStore`] contract the engine is written
//! against. [`PgStore`] implements the contract over the repositories;
//! [`MemoryStore`] implements it in process for tests and local runs.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{MemoryStore, PgStore, RotationStore};
