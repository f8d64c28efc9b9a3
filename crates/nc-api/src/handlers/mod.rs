//! Request handlers grouped by resource.

pub mod admin;
pub mod health;
pub mod numbers;
pub mod pools;
pub mod schedules;
pub mod teams;
