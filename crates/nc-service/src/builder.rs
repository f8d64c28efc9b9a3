//! Pool builder: raw number list → pool, ordered subpools and numbers.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use nc_core::error::AppError;
use nc_core::result::AppResult;
use nc_core::types::{TeamId, VendorId};
use nc_database::RotationStore;
use nc_entity::{NewNumber, NewPool, NewSubPool, Pool, SubPool};

/// Upper bound on ` (n)` suffixes tried when a pool name is taken.
const MAX_NAME_SUFFIX: u32 = 1_000;

/// Input of [`PoolBuilder::build`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildPoolRequest {
    /// Requested pool name.
    pub name: String,
    /// Vendor of every number.
    pub vendor_id: VendorId,
    /// Team that will dial with the pool.
    pub team_id: TeamId,
    /// Numbers per subpool.
    pub subpool_block: i32,
    /// Raw number values, in order.
    pub numbers: Vec<String>,
}

/// What the builder wrote.
#[derive(Debug, Clone, Serialize)]
pub struct BuiltPool {
    /// The pool as created.
    pub pool: Pool,
    /// Its subpools in index order.
    pub subpools: Vec<SubPool>,
    /// Numbers written.
    pub numbers: u64,
}

/// Trim, drop blanks and de-duplicate, keeping first occurrences in order.
pub fn normalize_numbers(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}

/// Creates pools from parsed number lists.
#[derive(Clone)]
pub struct PoolBuilder {
    store: Arc<dyn RotationStore>,
}

impl std::fmt::Debug for PoolBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolBuilder").finish()
    }
}

impl PoolBuilder {
    /// Creates a new pool builder.
    pub fn new(store: Arc<dyn RotationStore>) -> Self {
        Self { store }
    }

    /// Validate the request and write the pool.
    ///
    /// Nothing is written when validation fails. Once writing starts, a
    /// failure leaves the rows written so far in place.
    pub async fn build(&self, request: BuildPoolRequest) -> AppResult<BuiltPool> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Pool name must not be empty"));
        }
        if request.subpool_block < 1 {
            return Err(AppError::validation("Subpool block size must be at least 1"));
        }
        if self.store.find_vendor(request.vendor_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Vendor {} not found",
                request.vendor_id
            )));
        }
        if self.store.find_team(request.team_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Team {} not found",
                request.team_id
            )));
        }

        let values = normalize_numbers(&request.numbers);
        if values.is_empty() {
            return Err(AppError::configuration("Number list is empty"));
        }

        let name = self.free_name(name).await?;
        let block = request.subpool_block as usize;
        let chunks: Vec<&[String]> = values.chunks(block).collect();

        let pool = self
            .store
            .create_pool(&NewPool {
                name,
                subpool_block: request.subpool_block,
                vendor_id: request.vendor_id,
                team_id: request.team_id,
                num_count: values.len() as i32,
                subpool_count: chunks.len() as i32,
            })
            .await?;

        let mut subpools = Vec::with_capacity(chunks.len());
        let mut numbers = Vec::with_capacity(values.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let subpool = self
                .store
                .create_subpool(&NewSubPool {
                    pool_id: pool.id,
                    index: index as i32,
                })
                .await?;
            numbers.extend(chunk.iter().map(|value| NewNumber {
                value: value.clone(),
                pool_id: pool.id,
                subpool_id: subpool.id,
                vendor_id: request.vendor_id,
                team_id: request.team_id,
            }));
            subpools.push(subpool);
        }
        let written = self.store.create_numbers(&numbers).await?;

        info!(
            pool_id = %pool.id,
            name = %pool.name,
            numbers = written,
            subpools = subpools.len(),
            block = request.subpool_block,
            "Pool built"
        );

        Ok(BuiltPool {
            pool,
            subpools,
            numbers: written,
        })
    }

    /// `name`, or `name (2)`, `name (3)`, … whichever is free first.
    ///
    /// Not atomic: a concurrent build can still take the name, in which case
    /// the insert fails on the unique constraint.
    async fn free_name(&self, name: &str) -> AppResult<String> {
        if !self.store.pool_name_exists(name).await? {
            return Ok(name.to_string());
        }
        for suffix in 2..=MAX_NAME_SUFFIX {
            let candidate = format!("{name} ({suffix})");
            if !self.store.pool_name_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(AppError::conflict(format!(
            "No free pool name derived from '{name}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;
    use nc_core::error::ErrorKind;
    use nc_entity::SubPoolStatus;

    #[test]
    fn test_normalize_trims_and_dedupes_in_order() {
        let raw: Vec<String> = [" 2 ", "1", "", "2", "  ", "3", "1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(normalize_numbers(&raw), vec!["2", "1", "3"]);
    }

    #[tokio::test]
    async fn test_ten_numbers_block_four() {
        let fx = Fixture::new().await;
        let built = fx.pool("alpha", 4, 10).await;

        assert_eq!(built.pool.num_count, 10);
        assert_eq!(built.pool.subpool_count, 3);
        assert!(built.pool.active);
        assert_eq!(built.numbers, 10);

        let sizes: Vec<i64> = {
            let mut sizes = Vec::new();
            for subpool in &built.subpools {
                sizes.push(fx.store.count_subpool_numbers(subpool.id).await.expect("count"));
            }
            sizes
        };
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(
            built.subpools.iter().map(|s| s.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(built.subpools.iter().all(|s| s.status == SubPoolStatus::Inactive));

        let numbers = fx.store.list_numbers(built.pool.id).await.expect("numbers");
        assert!(numbers
            .iter()
            .all(|n| !n.label && !n.used && n.enabled && !n.active && n.spin == 0));
        assert_eq!(numbers[0].value, "79000000000");
    }

    #[tokio::test]
    async fn test_taken_name_gets_suffix() {
        let fx = Fixture::new().await;
        fx.pool("alpha", 4, 2).await;
        let second = fx.pool("alpha", 4, 2).await;
        let third = fx.pool("alpha", 4, 2).await;
        assert_eq!(second.pool.name, "alpha (2)");
        assert_eq!(third.pool.name, "alpha (3)");
    }

    #[tokio::test]
    async fn test_blank_list_is_rejected_without_writes() {
        let fx = Fixture::new().await;
        let err = fx
            .services
            .builder
            .build(BuildPoolRequest {
                name: "alpha".into(),
                vendor_id: fx.vendor.id,
                team_id: fx.team.id,
                subpool_block: 4,
                numbers: vec![" ".into(), String::new()],
            })
            .await
            .expect_err("empty list");
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(fx.store.list_pools(None).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_invalid_block_and_unknown_vendor() {
        let fx = Fixture::new().await;
        let request = BuildPoolRequest {
            name: "alpha".into(),
            vendor_id: fx.vendor.id,
            team_id: fx.team.id,
            subpool_block: 0,
            numbers: vec!["1".into()],
        };
        let err = fx
            .services
            .builder
            .build(request.clone())
            .await
            .expect_err("block 0");
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = fx
            .services
            .builder
            .build(BuildPoolRequest {
                subpool_block: 1,
                vendor_id: VendorId(404),
                ..request
            })
            .await
            .expect_err("unknown vendor");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
