//! Per-table repositories over a shared `PgPool`.

pub mod log;
pub mod number;
pub mod pool;
pub mod schedule;
pub mod subpool;
pub mod team;
pub mod vendor;

pub use log::UsageLogRepository;
pub use number::NumberRepository;
pub use pool::PoolRepository;
pub use schedule::ScheduleRepository;
pub use subpool::SubPoolRepository;
pub use team::TeamRepository;
pub use vendor::VendorRepository;
