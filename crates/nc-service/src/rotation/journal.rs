//! Hand-over bookkeeping between the previous live number and the new one.

use tracing::{debug, warn};

use nc_core::result::AppResult;
use nc_core::types::NumberId;
use nc_database::RotationStore;
use nc_entity::{Number, Pool, SubPool};

/// The number that was live for the pool before `current` took over.
///
/// The live subpool remembers it in `last_nid`. Right after a subpool
/// transition that field is empty and the previous number belongs to the
/// subpool that was just retired: the sibling flagged `last_changed`, or
/// failing that the one before it in index order (wrapping to the last).
pub(super) fn previous_number(current: &SubPool, siblings: &[SubPool]) -> Option<NumberId> {
    if current.last_nid.is_some() {
        return current.last_nid;
    }

    let current_id = current.id;
    let others = || siblings.iter().filter(move |s| s.id != current_id);
    let transitioned = others().find(|s| s.last_changed).or_else(|| {
        let previous_index = if current.index > 0 {
            Some(current.index - 1)
        } else {
            siblings.iter().map(|s| s.index).max()
        };
        previous_index.and_then(|index| others().find(|s| s.index == index))
    });

    transitioned.and_then(|s| s.last_nid)
}

/// Take the previous number off the air and close its usage log.
///
/// The previous number is whatever the pool still has live besides
/// `next`. Subpool bookkeeping is only consulted when nothing is live, and
/// `None` means the pool never had a number on the air.
pub(super) async fn end_previous(
    store: &dyn RotationStore,
    pool: &Pool,
    current: &SubPool,
    next: &Number,
) -> AppResult<Option<NumberId>> {
    let live: Vec<NumberId> = store
        .live_numbers(pool.id)
        .await?
        .into_iter()
        .map(|n| n.id)
        .filter(|id| *id != next.id)
        .collect();

    if let Some(&previous) = live.first() {
        if live.len() > 1 {
            warn!(pool_id = %pool.id, live = live.len(), "Pool had several live numbers");
        }
        for &number_id in &live {
            store.deactivate_number(number_id).await?;
            close_logs(store, pool, number_id).await?;
        }
        return Ok(Some(previous));
    }

    let siblings = store.list_subpools(pool.id).await?;
    let Some(previous) = previous_number(current, &siblings) else {
        debug!(
            pool_id = %pool.id,
            subpool_id = %current.id,
            "Initial activation; no previous number to close"
        );
        return Ok(None);
    };

    if previous != next.id {
        store.deactivate_number(previous).await?;
    }
    close_logs(store, pool, previous).await?;
    Ok(Some(previous))
}

async fn close_logs(store: &dyn RotationStore, pool: &Pool, number_id: NumberId) -> AppResult<()> {
    let closed = store.close_number_logs(number_id).await?;
    if closed == 0 {
        warn!(pool_id = %pool.id, number_id = %number_id, "Previous number had no open usage log");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nc_core::types::{PoolId, SubPoolId};
    use nc_entity::SubPoolStatus;

    fn subpool(id: i64, index: i32, last_nid: Option<i64>, last_changed: bool) -> SubPool {
        SubPool {
            id: SubPoolId(id),
            pool_id: PoolId(1),
            index,
            status: SubPoolStatus::Inactive,
            activated_at: None,
            spin: 0,
            last_nid: last_nid.map(NumberId),
            last_changed,
        }
    }

    #[test]
    fn test_own_last_number_wins() {
        let current = subpool(1, 0, Some(5), false);
        let siblings = vec![current.clone(), subpool(2, 1, Some(9), true)];
        assert_eq!(previous_number(&current, &siblings), Some(NumberId(5)));
    }

    #[test]
    fn test_last_changed_sibling_is_used_after_transition() {
        let current = subpool(2, 1, None, false);
        let siblings = vec![
            subpool(1, 0, Some(3), true),
            current.clone(),
            subpool(3, 2, Some(8), false),
        ];
        assert_eq!(previous_number(&current, &siblings), Some(NumberId(3)));
    }

    #[test]
    fn test_index_zero_wraps_to_last_subpool() {
        let current = subpool(1, 0, None, false);
        let siblings = vec![
            current.clone(),
            subpool(2, 1, Some(4), false),
            subpool(3, 2, Some(8), false),
        ];
        assert_eq!(previous_number(&current, &siblings), Some(NumberId(8)));
    }

    #[test]
    fn test_fresh_pool_has_no_previous() {
        let current = subpool(1, 0, None, false);
        let siblings = vec![current.clone(), subpool(2, 1, None, false)];
        assert_eq!(previous_number(&current, &siblings), None);
    }

    #[test]
    fn test_single_subpool_has_no_sibling() {
        let current = subpool(1, 0, None, false);
        assert_eq!(previous_number(&current, std::slice::from_ref(&current)), None);
    }
}
