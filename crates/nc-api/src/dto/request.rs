//! Request DTOs with validation.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use nc_core::error::AppError;
use nc_core::types::{NumberId, PoolId, TeamId, VendorId};
use nc_entity::NewSchedule;
use nc_service::{BuildPoolRequest, MoveRequest};

/// Run the `validator` rules of a request body.
pub fn validated<T: Validate>(request: T) -> Result<T, AppError> {
    request
        .validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))?;
    Ok(request)
}

/// Pool listing filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolListQuery {
    /// Restrict to one team.
    pub team_id: Option<TeamId>,
}

/// Create pool request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePoolRequest {
    /// Pool name; suffixed when taken.
    #[validate(length(min = 1, max = 255, message = "Pool name is required"))]
    pub name: String,
    /// Vendor of the numbers.
    pub vendor_id: VendorId,
    /// Owning team.
    pub team_id: TeamId,
    /// Numbers per subpool.
    #[validate(range(min = 1, message = "Subpool block must be at least 1"))]
    pub subpool_block: i32,
    /// Raw numbers, one per entry.
    #[validate(length(min = 1, message = "At least one number is required"))]
    pub numbers: Vec<String>,
}

impl From<CreatePoolRequest> for BuildPoolRequest {
    fn from(req: CreatePoolRequest) -> Self {
        Self {
            name: req.name,
            vendor_id: req.vendor_id,
            team_id: req.team_id,
            subpool_block: req.subpool_block,
            numbers: req.numbers,
        }
    }
}

/// Number include/exclude request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NumberIdsRequest {
    /// Numbers to update.
    #[validate(length(min = 1, message = "At least one number id is required"))]
    pub ids: Vec<NumberId>,
}

/// Redistribution request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MoveNumbersRequest {
    /// Numbers to take from each source subpool.
    #[validate(range(min = 1, message = "Count must be at least 1"))]
    pub count: i64,
    /// Source pool.
    pub from_pool: PoolId,
    /// Destination pool.
    pub to_pool: PoolId,
    /// Team the operator acts for.
    pub team_id: TeamId,
    /// Vendor of the source pool.
    pub src_vendor: VendorId,
    /// Vendor of the destination pool.
    pub dst_vendor: VendorId,
    /// Subpool count of the source as the caller sees it.
    #[serde(default)]
    pub src_subpool_count: i32,
    /// Subpool count of the destination as the caller sees it.
    #[serde(default)]
    pub dst_subpool_count: i32,
}

impl From<MoveNumbersRequest> for MoveRequest {
    fn from(req: MoveNumbersRequest) -> Self {
        Self {
            count: req.count,
            from_pool: req.from_pool,
            to_pool: req.to_pool,
            team_id: req.team_id,
            src_vendor: req.src_vendor,
            dst_vendor: req.dst_vendor,
            src_subpool_count: req.src_subpool_count,
            dst_subpool_count: req.dst_subpool_count,
        }
    }
}

/// Create schedule request. Times are `HH:MM:SS` in the service zone.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateScheduleRequest {
    /// Display name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Window start.
    pub start_time: NaiveTime,
    /// Window stop.
    pub stop_time: NaiveTime,
    /// Rotation period in seconds.
    #[validate(range(min = 1, message = "Period must be at least one second"))]
    pub periodic_sec: i32,
    /// Team.
    pub team_id: TeamId,
}

impl From<CreateScheduleRequest> for NewSchedule {
    fn from(req: CreateScheduleRequest) -> Self {
        Self {
            name: req.name,
            start_time: req.start_time,
            stop_time: req.stop_time,
            periodic_sec: req.periodic_sec,
            team_id: req.team_id,
        }
    }
}
