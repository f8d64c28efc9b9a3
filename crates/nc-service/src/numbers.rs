//! Bulk include/exclude of numbers.

use std::sync::Arc;

use tracing::info;

use nc_core::error::AppError;
use nc_core::result::AppResult;
use nc_core::types::NumberId;
use nc_database::RotationStore;

/// Toggles whether numbers may be selected by rotation.
///
/// Exclusion only clears `enabled`; a live number stays live until the
/// next rotation replaces it.
#[derive(Clone)]
pub struct NumberService {
    store: Arc<dyn RotationStore>,
}

impl std::fmt::Debug for NumberService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NumberService").finish()
    }
}

impl NumberService {
    /// Creates a new number service.
    pub fn new(store: Arc<dyn RotationStore>) -> Self {
        Self { store }
    }

    /// Remove numbers from selection. Returns how many changed.
    pub async fn exclude(&self, ids: &[NumberId]) -> AppResult<u64> {
        self.set_enabled(ids, false).await
    }

    /// Return numbers to selection. Returns how many changed.
    pub async fn include(&self, ids: &[NumberId]) -> AppResult<u64> {
        self.set_enabled(ids, true).await
    }

    async fn set_enabled(&self, ids: &[NumberId], enabled: bool) -> AppResult<u64> {
        if ids.is_empty() {
            return Err(AppError::validation("At least one number id is required"));
        }
        let changed = self.store.set_numbers_enabled(ids, enabled).await?;
        info!(requested = ids.len(), changed, enabled, "Number selection updated");
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;

    #[tokio::test]
    async fn test_exclude_keeps_rotation_flags() {
        let fx = Fixture::new().await;
        let built = fx.pool("alpha", 4, 4).await;
        let numbers = fx.store.list_numbers(built.pool.id).await.expect("numbers");
        fx.store.mark_number_live(numbers[0].id).await.expect("live");

        let ids = [numbers[0].id, numbers[1].id];
        assert_eq!(fx.services.numbers.exclude(&ids).await.expect("exclude"), 2);
        assert_eq!(fx.services.numbers.exclude(&ids).await.expect("exclude"), 0);

        let live = fx.store.find_number(numbers[0].id).await.expect("find").expect("n");
        assert!(!live.enabled);
        assert!(live.active && live.label && live.used);

        assert_eq!(fx.services.numbers.include(&ids).await.expect("include"), 2);
    }

    #[tokio::test]
    async fn test_empty_list_is_rejected() {
        let fx = Fixture::new().await;
        assert!(fx.services.numbers.exclude(&[]).await.is_err());
    }
}
