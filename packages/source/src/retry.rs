//! Retry with exponential backoff and jitter.
//!
//! Every open-data request runs through [`retry_with_backoff`]. Each
//! attempt is submitted to the [`RequestQueue`] separately, so a request
//! sleeping out its backoff does not hold a concurrency slot.
//!
//! # Usage
//!
//! ```ignore
//! let body = retry::retry_with_backoff(
//!     &queue,
//!     PRIORITY_INTERACTIVE,
//!     &RetryPolicy::default(),
//!     retry::always_retry,
//!     |_, _, _| {},
//!     || client.get(url.clone()).send(),
//! )
//! .await?;
//! ```

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng as _;

use crate::queue::RequestQueue;

/// Maximum number of retries after the first attempt.
pub const MAX_RETRIES: u32 = 5;

/// Base delay for the exponential backoff.
pub const BASE_DELAY: Duration = Duration::from_millis(500);

/// How many times to retry and how long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Total attempts is this plus one.
    pub max_retries: u32,
    /// Delay before the first retry, before jitter.
    pub base_delay: Duration,
    /// Scales each delay by a uniform factor in `[0, 1)` when set.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: BASE_DELAY,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given zero-based failed attempt:
    /// `base_delay * 2^attempt`, scaled by a random factor when jitter is
    /// enabled.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(factor);
        if self.jitter {
            delay.mul_f64(rand::thread_rng().r#gen::<f64>())
        } else {
            delay
        }
    }
}

/// Retry predicate that treats every failure as transient.
///
/// Rate limiting and server errors surface the same way as client errors
/// from the portal, so nothing is singled out.
#[must_use]
pub const fn always_retry<E>(_error: &E) -> bool {
    true
}

/// Runs `op` through `queue` until it succeeds, the retry budget is spent,
/// or `should_retry` rejects the error.
///
/// `on_retry` is called with the zero-based index of the failed attempt,
/// the error, and the delay about to be slept, before each retry.
///
/// # Errors
///
/// Returns the error of the final attempt.
pub async fn retry_with_backoff<T, E, F, Fut, S, R>(
    queue: &RequestQueue,
    priority: i32,
    policy: &RetryPolicy,
    should_retry: S,
    on_retry: R,
    mut op: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    S: Fn(&E) -> bool,
    R: Fn(u32, &E, Duration),
{
    let mut attempt = 0;
    loop {
        match queue.add(priority, &mut op).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= policy.max_retries {
                    log::error!(
                        "request failed after {} attempt(s), giving up: {e}",
                        attempt + 1
                    );
                    return Err(e);
                }
                if !should_retry(&e) {
                    log::debug!("request failed with non-retryable error: {e}");
                    return Err(e);
                }
                let delay = policy.backoff_delay(attempt);
                log::warn!(
                    "  retry {}/{} in {delay:?}: {e}",
                    attempt + 1,
                    policy.max_retries
                );
                on_retry(attempt, &e, delay);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::queue::PRIORITY_INTERACTIVE;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
            jitter: false,
        }
    }

    #[test]
    fn backoff_doubles_without_jitter() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
            jitter: false,
        };
        assert_eq!(policy.backoff_delay(0), Duration::from_millis(100));
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(800));
    }

    #[test]
    fn jittered_backoff_stays_below_exponential_bound() {
        let policy = RetryPolicy::default();
        for attempt in 0..5 {
            let bound = BASE_DELAY * 2u32.pow(attempt);
            assert!(policy.backoff_delay(attempt) <= bound);
        }
    }

    #[test]
    fn huge_attempt_saturates() {
        let policy = fast_policy(0);
        assert!(policy.backoff_delay(64) > Duration::ZERO);
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let queue = RequestQueue::new(1);
        let calls = AtomicU32::new(0);
        let retries = Mutex::new(Vec::new());

        let result: Result<u32, String> = retry_with_backoff(
            &queue,
            PRIORITY_INTERACTIVE,
            &fast_policy(5),
            always_retry,
            |attempt, _e: &String, _delay| retries.lock().unwrap().push(attempt),
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(format!("failure {n}"))
                    } else {
                        Ok(n)
                    }
                }
            },
        )
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(*retries.lock().unwrap(), vec![0, 1]);
        assert_eq!(queue.running(), 0);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let queue = RequestQueue::new(1);
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = retry_with_backoff(
            &queue,
            PRIORITY_INTERACTIVE,
            &fast_policy(2),
            always_retry,
            |_, _, _| {},
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("failure {n}")) }
            },
        )
        .await;

        assert_eq!(result, Err("failure 2".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_stops_immediately() {
        let queue = RequestQueue::new(1);
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = retry_with_backoff(
            &queue,
            PRIORITY_INTERACTIVE,
            &fast_policy(5),
            |_e: &String| false,
            |_, _, _| panic!("should not retry"),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("bad request".to_string()) }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
