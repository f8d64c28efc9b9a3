//! Helpers shared by the per-pool reports.

use serde::Serializer;

use nc_core::error::{AppError, ErrorKind};
use nc_core::result::AppResult;
use nc_core::types::PoolId;

/// Serialize an [`AppError`] as its display string.
pub(crate) fn serialize_error<S>(error: &AppError, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&error.to_string())
}

/// Fold per-pool failures into one error, keeping every message.
///
/// The combined kind is the shared kind of all failures, or `Internal`
/// when they disagree.
pub(crate) fn aggregate<'a, I>(failures: I) -> AppResult<()>
where
    I: IntoIterator<Item = (PoolId, &'a AppError)>,
{
    let failures: Vec<(PoolId, &AppError)> = failures.into_iter().collect();
    let Some((_, first)) = failures.first() else {
        return Ok(());
    };

    let kind = if failures.iter().all(|(_, e)| e.kind == first.kind) {
        first.kind
    } else {
        ErrorKind::Internal
    };
    let message = failures
        .iter()
        .map(|(pool_id, e)| format!("pool {pool_id}: {}", e.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(AppError::new(kind, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_keeps_every_message() {
        let a = AppError::exhausted("no number");
        let b = AppError::external("webitel down");
        let err = aggregate([(PoolId(1), &a), (PoolId(2), &b)]).expect_err("two failures");
        assert_eq!(err.kind, ErrorKind::Internal);
        assert!(err.message.contains("pool 1: no number"));
        assert!(err.message.contains("pool 2: webitel down"));
    }

    #[test]
    fn test_aggregate_same_kind_is_kept() {
        let a = AppError::exhausted("a");
        let b = AppError::exhausted("b");
        let err = aggregate([(PoolId(1), &a), (PoolId(2), &b)]).expect_err("failures");
        assert_eq!(err.kind, ErrorKind::Exhausted);
    }

    #[test]
    fn test_aggregate_empty_is_ok() {
        assert!(aggregate(Vec::<(PoolId, &AppError)>::new()).is_ok());
    }
}
