//! Single-retry wrapper for read paths

use super::StorageResult;

/// Run a read operation, retrying once on persistence failure
///
/// Only for idempotent reads (floor rebuild, session sales). The second
/// failure is returned to the caller.
pub fn with_read_retry<T>(
    operation: &'static str,
    mut read: impl FnMut() -> StorageResult<T>,
) -> StorageResult<T> {
    match read() {
        Ok(value) => Ok(value),
        Err(first) => {
            tracing::warn!(operation, error = %first, "Read failed, retrying once");
            read().inspect_err(|second| {
                tracing::error!(operation, error = %second, "Read failed after retry");
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    fn transient() -> StorageError {
        StorageError::Serialization(serde_json::from_str::<u8>("x").unwrap_err())
    }

    #[test]
    fn test_success_is_not_retried() {
        let mut calls = 0;
        let result = with_read_retry("test", || {
            calls += 1;
            Ok(7)
        });
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_first_failure_is_retried() {
        let mut calls = 0;
        let result = with_read_retry("test", || {
            calls += 1;
            if calls == 1 { Err(transient()) } else { Ok("ok") }
        });
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_second_failure_surfaces() {
        let mut calls = 0;
        let result: StorageResult<()> = with_read_retry("test", || {
            calls += 1;
            Err(transient())
        });
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }
}
