//! Storage timeout helpers
//!
//! Every storage call is bounded so a hung disk or database never blocks the
//! ledger lock indefinitely.

use super::errors::{StoreError, StoreResult};
use std::time::Duration;
use tokio::time::timeout;

/// Default timeout for a single load or save (5 seconds)
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Execute a storage operation with timeout
///
/// # Arguments
///
/// * `duration` - Timeout duration
/// * `future` - Async operation to execute
///
/// # Returns
///
/// * `StoreResult<T>` - Result, the operation's own error, or `StoreError::Timeout`
///
/// # Example
///
/// ```
/// use beer_pot::store::timeouts::{with_timeout, DEFAULT_STORE_TIMEOUT};
///
/// # async fn example() -> Result<(), beer_pot::store::StoreError> {
/// let text = with_timeout(DEFAULT_STORE_TIMEOUT, tokio::fs::read_to_string("Cargo.toml")).await?;
/// # let _ = text;
/// # Ok(())
/// # }
/// ```
pub async fn with_timeout<F, T, E>(duration: Duration, future: F) -> StoreResult<T>
where
    F: std::future::Future<Output = Result<T, E>>,
    E: Into<StoreError>,
{
    match timeout(duration, future).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(StoreError::Timeout(duration)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_constant() {
        assert_eq!(DEFAULT_STORE_TIMEOUT.as_secs(), 5);
    }

    #[tokio::test]
    async fn test_timeout_error_display() {
        let err = StoreError::Timeout(Duration::from_secs(5));
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("5s"));
    }

    #[tokio::test]
    async fn test_slow_operation_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, std::io::Error>(())
        };
        let result = with_timeout(Duration::from_millis(10), slow).await;
        assert!(matches!(result, Err(StoreError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_inner_error_is_converted() {
        let failing = async {
            Err::<(), _>(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))
        };
        let result = with_timeout(DEFAULT_STORE_TIMEOUT, failing).await;
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
