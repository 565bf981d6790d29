// src/error_recovery.rs
//! Retry with exponential backoff for API operations.

use crate::constants::{INITIAL_RETRY_BACKOFF, MAX_REQUEST_RETRIES, MAX_RETRY_BACKOFF};
use crate::error::AppError;
use rand::Rng;
use std::time::Duration;

/// How transient failures are retried.
///
/// A retryable error is retried up to `max_retries` times. A server-supplied
/// `Retry-After` delay is used as given (capped at `max_backoff`); otherwise the
/// delay doubles from `initial_backoff` with up to 25% random jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_REQUEST_RETRIES,
            initial_backoff: INITIAL_RETRY_BACKOFF,
            max_backoff: MAX_RETRY_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based), ignoring any server hint.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        let base = self
            .initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff);

        let jitter_ms = (base.as_millis() / 4) as u64;
        let jitter = if jitter_ms > 0 {
            Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
        } else {
            Duration::ZERO
        };
        (base + jitter).min(self.max_backoff)
    }

    /// Delay before retry number `retry` after `error`.
    pub fn delay_for(&self, retry: u32, error: &AppError) -> Duration {
        match error.retry_after() {
            Some(hint) => hint.min(self.max_backoff),
            None => self.backoff_for(retry),
        }
    }

    /// Runs `operation` until it succeeds, fails permanently, or runs out of retries.
    ///
    /// Non-retryable errors are returned unchanged. When retries run out the last
    /// error is wrapped in [`AppError::RetriesExhausted`].
    pub async fn run<F, T, Fut>(&self, mut operation: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, AppError>>,
    {
        let mut retries = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if retries >= self.max_retries => {
                    if retries == 0 {
                        return Err(e);
                    }
                    return Err(AppError::RetriesExhausted {
                        attempts: retries + 1,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    retries += 1;
                    let delay = self.delay_for(retries, &e);
                    log::warn!(
                        "Attempt {} failed ({}), retrying after {:?}",
                        retries,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotionErrorCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient(retry_after: Option<Duration>) -> AppError {
        AppError::NotionService {
            code: NotionErrorCode::RateLimited,
            message: "slow down".to_string(),
            status: 429,
            request_id: Some("req-1".to_string()),
            retry_after,
        }
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_retries: 5,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
        };
        let first = policy.backoff_for(1);
        assert!(first >= Duration::from_millis(500) && first <= Duration::from_millis(625));
        let third = policy.backoff_for(3);
        assert!(third >= Duration::from_millis(2000) && third <= Duration::from_millis(2500));
        assert_eq!(policy.backoff_for(20), Duration::from_secs(30));
    }

    #[test]
    fn test_retry_after_hint_wins() {
        let policy = RetryPolicy::default();
        let delay = policy.delay_for(1, &transient(Some(Duration::from_secs(2))));
        assert_eq!(delay, Duration::from_secs(2));

        let capped = policy.delay_for(1, &transient(Some(Duration::from_secs(600))));
        assert_eq!(capped, policy.max_backoff);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = fast_policy(3)
            .run(move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(transient(None))
                } else {
                    Ok("done")
                }
            })
            .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_wraps_last_error() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), _> = fast_policy(2)
            .run(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(transient(None))
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(AppError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, AppError::NotionService { status: 429, .. }));
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_permanent_errors_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), _> = fast_policy(5)
            .run(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(AppError::MalformedResponse("bad".to_string()))
            })
            .await;
        assert!(matches!(result, Err(AppError::MalformedResponse(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
