//! Administrative bulk move of numbers from one pool to another.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use nc_core::error::AppError;
use nc_core::result::AppResult;
use nc_core::types::{PoolId, TeamId, VendorId};
use nc_database::RotationStore;
use nc_entity::{NewSubPool, Number, Pool, SubPool};

/// Input of [`Redistributor::move_numbers`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Numbers to take from each source subpool.
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
    /// Subpool count of the source as seen by the caller.
    pub src_subpool_count: i32,
    /// Subpool count of the destination as seen by the caller.
    pub dst_subpool_count: i32,
}

/// What a move did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveSummary {
    /// Numbers reassigned.
    pub moved: usize,
    /// Destination subpools created for the overflow.
    pub created_subpools: usize,
    /// Per-subpool capacity used for the destination.
    pub capacity: i64,
}

/// Destination subpool and how many numbers it holds.
struct Slot {
    subpool: SubPool,
    occupancy: i64,
}

/// Moves numbers between pools of one vendor.
#[derive(Clone)]
pub struct Redistributor {
    store: Arc<dyn RotationStore>,
}

impl std::fmt::Debug for Redistributor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Redistributor").finish()
    }
}

impl Redistributor {
    /// Creates a new redistributor.
    pub fn new(store: Arc<dyn RotationStore>) -> Self {
        Self { store }
    }

    /// Move up to `count` non-live numbers out of every source subpool
    /// into the destination pool.
    ///
    /// Not transactional: the first error is returned and earlier moves
    /// stay in place.
    pub async fn move_numbers(&self, request: &MoveRequest) -> AppResult<MoveSummary> {
        let (source, destination) = self.validate(request).await?;

        let capacity = capacity(&destination, request.count)?;
        let candidates = self.collect_candidates(&source, request.count).await?;

        let mut slots = Vec::new();
        for subpool in self.store.list_subpools(destination.id).await? {
            let occupancy = self.store.count_subpool_numbers(subpool.id).await?;
            slots.push(Slot { subpool, occupancy });
        }

        let mut remaining = candidates.into_iter().peekable();
        let mut moved = 0;
        let mut cursor = 0;
        while remaining.peek().is_some() {
            let Some(position) = next_open_slot(&slots, cursor, capacity) else {
                break;
            };
            if let Some(number) = remaining.next() {
                let slot = &mut slots[position];
                self.store
                    .move_number(number.id, destination.id, slot.subpool.id)
                    .await?;
                slot.occupancy += 1;
                moved += 1;
            }
            cursor = position + 1;
        }

        let mut created_subpools = 0;
        let mut next_index = self
            .store
            .max_subpool_index(destination.id)
            .await?
            .map_or(0, |max| max + 1);
        while remaining.peek().is_some() {
            let subpool = self
                .store
                .create_subpool(&NewSubPool {
                    pool_id: destination.id,
                    index: next_index,
                })
                .await?;
            next_index += 1;
            created_subpools += 1;
            for number in remaining.by_ref().take(capacity as usize) {
                self.store
                    .move_number(number.id, destination.id, subpool.id)
                    .await?;
                moved += 1;
            }
        }

        self.store.refresh_pool_counts(source.id).await?;
        self.store.refresh_pool_counts(destination.id).await?;

        info!(
            from_pool = %source.id,
            to_pool = %destination.id,
            moved,
            created_subpools,
            capacity,
            "Numbers redistributed"
        );
        Ok(MoveSummary {
            moved,
            created_subpools,
            capacity,
        })
    }

    async fn validate(&self, request: &MoveRequest) -> AppResult<(Pool, Pool)> {
        if request.count < 1 {
            return Err(AppError::validation("count must be at least 1"));
        }
        if request.from_pool == request.to_pool {
            return Err(AppError::validation("Source and destination pool must differ"));
        }
        if request.src_vendor != request.dst_vendor {
            return Err(AppError::validation(
                "Numbers can only move between pools of the same vendor",
            ));
        }

        let source = self.load_pool(request.from_pool).await?;
        let destination = self.load_pool(request.to_pool).await?;

        if source.vendor_id != request.src_vendor || destination.vendor_id != request.dst_vendor {
            return Err(AppError::validation(format!(
                "Pools {} and {} do not both belong to vendor {}",
                source.id, destination.id, request.src_vendor
            )));
        }

        if source.subpool_count != request.src_subpool_count
            || destination.subpool_count != request.dst_subpool_count
        {
            warn!(
                from_pool = %source.id,
                to_pool = %destination.id,
                stored_src = source.subpool_count,
                stored_dst = destination.subpool_count,
                requested_src = request.src_subpool_count,
                requested_dst = request.dst_subpool_count,
                "Requested subpool counts differ from stored counts"
            );
        }
        if source.team_id != request.team_id || destination.team_id != request.team_id {
            warn!(
                team_id = %request.team_id,
                src_team = %source.team_id,
                dst_team = %destination.team_id,
                "Pools do not belong to the requesting team"
            );
        }

        Ok((source, destination))
    }

    async fn load_pool(&self, id: PoolId) -> AppResult<Pool> {
        self.store
            .find_pool(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Pool {id} not found")))
    }

    /// Up to `count` non-live numbers from each source subpool, in index
    /// order then id order.
    async fn collect_candidates(&self, source: &Pool, count: i64) -> AppResult<Vec<Number>> {
        let mut candidates = Vec::new();
        for subpool in self.store.list_subpools(source.id).await? {
            candidates.extend(self.store.movable_numbers(subpool.id, count).await?);
        }
        Ok(candidates)
    }
}

/// Per-subpool capacity of the destination: its average subpool size
/// rounded up plus `count`, or just `count` when it has no subpools.
fn capacity(destination: &Pool, count: i64) -> AppResult<i64> {
    if destination.subpool_count <= 0 {
        return Ok(count);
    }
    i64::from(destination.average_subpool_size())
        .checked_add(count)
        .ok_or_else(|| AppError::validation(format!("count {count} is too large")))
}

/// First slot at or after `cursor` (wrapping) with room left.
fn next_open_slot(slots: &[Slot], cursor: usize, capacity: i64) -> Option<usize> {
    let len = slots.len();
    (0..len)
        .map(|offset| (cursor + offset) % len)
        .find(|&position| slots[position].occupancy < capacity)
}
