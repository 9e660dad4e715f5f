//! Retry of store calls with exponential backoff
//!
//! Only failures classified `TransientService` are retried. The last error is
//! returned once attempts run out, so callers can still classify it.

use std::fmt::Display;
use tracing::warn;
use vantage_domain::{Classify, RetryPolicy};

/// Run a blocking store call under a retry policy
///
/// Sleeps the current thread between attempts; use [`with_retry_async`] from
/// async code.
pub fn with_retry<T, E, F>(policy: &RetryPolicy, operation: &str, mut call: F) -> Result<T, E>
where
    E: Classify + Display,
    F: FnMut() -> Result<T, E>,
{
    let mut attempt = 1;
    loop {
        match call() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.attempts() => {
                let delay = policy.delay_after(attempt);
                warn!(operation, attempt, delay_ms = delay.as_millis() as u64, error = %e, "Retrying store call");
                std::thread::sleep(delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Run a store call under a retry policy, sleeping on the tokio timer
///
/// `call` is synchronous: acquire the store lock inside it, so the lock is
/// released before any backoff sleep.
pub async fn with_retry_async<T, E, F>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T, E>
where
    E: Classify + Display,
    F: FnMut() -> Result<T, E>,
{
    let mut attempt = 1;
    loop {
        match call() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.attempts() => {
                let delay = policy.delay_after(attempt);
                warn!(operation, attempt, delay_ms = delay.as_millis() as u64, error = %e, "Retrying store call");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;

    #[test]
    fn test_transient_then_success() {
        let mut calls = 0;
        let result: Result<u32, StoreError> = with_retry(&RetryPolicy::immediate(3), "append", || {
            calls += 1;
            if calls < 3 {
                Err(StoreError::Unavailable("busy".into()))
            } else {
                Ok(7)
            }
        });
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_gives_up_after_attempts() {
        let mut calls = 0;
        let result: Result<(), StoreError> = with_retry(&RetryPolicy::immediate(2), "append", || {
            calls += 1;
            Err(StoreError::Unavailable("busy".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_permanent_not_retried() {
        let mut calls = 0;
        let result: Result<(), StoreError> = with_retry(&RetryPolicy::immediate(5), "read", || {
            calls += 1;
            Err(StoreError::UnknownTable("t".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_async_retry() {
        let mut calls = 0;
        let result: Result<&str, StoreError> =
            with_retry_async(&RetryPolicy::immediate(4), "clear", || {
                calls += 1;
                if calls == 1 {
                    Err(StoreError::Unavailable("busy".into()))
                } else {
                    Ok("done")
                }
            })
            .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls, 2);
    }
}
