//! Retry/backoff controller for single provider calls.
//!
//! Wraps one provider operation with bounded retries and exponential delay.
//! Only transient errors (`RateLimited`, `Provider`) are retried; `NotFound`
//! propagates immediately so the fallback resolver can advance to the next
//! tier without wasted delay. The last error is always surfaced on
//! exhaustion; there is no partial/null exit path.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::RetryIf;

use crate::config::{RETRY_BASE_DELAY_MS, RETRY_MAX_ATTEMPTS, RETRY_MAX_DELAY_SECS};
use crate::error_handling::GeocodeError;

/// Retry parameters for one provider call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts (initial attempt + retries).
    pub max_attempts: usize,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: RETRY_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Builds the backoff delay sequence: `base, 2*base, 4*base, ...`,
    /// capped at `RETRY_MAX_DELAY_SECS` and limited to `max_attempts - 1`
    /// delays (one fewer than the number of attempts).
    ///
    /// `ExponentialBackoff::from_millis(n)` raises `n` itself to the power of
    /// the attempt number, so a base of 2 with `factor(base/2)` yields the
    /// plain doubling sequence.
    fn delays(&self) -> impl Iterator<Item = Duration> {
        let factor = (self.base_delay.as_millis() as u64 / 2).max(1);
        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(Duration::from_secs(RETRY_MAX_DELAY_SECS))
            .take(self.max_attempts.saturating_sub(1))
    }
}

/// Result of a retried operation, including how many attempts were made.
#[derive(Debug)]
pub struct RetryOutcome<T> {
    /// The final result: success, or the last error after exhaustion.
    pub result: Result<T, GeocodeError>,
    /// Attempts actually made (1 = no retries).
    pub attempts: u32,
}

/// Runs `operation` with the policy's retry schedule.
///
/// The operation is retried only while it fails with a retriable error; a
/// `NotFound` (or any other non-retriable error) is returned on the attempt
/// that produced it, without consuming further attempts or delay.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut operation: F) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GeocodeError>>,
{
    // Attempt counting mirrors the closure invocations; AtomicU32 because the
    // action closure must be shareable with the retry machinery
    let attempt_count = Arc::new(AtomicU32::new(0));

    let result = RetryIf::start(
        policy.delays(),
        {
            let attempt_count = Arc::clone(&attempt_count);
            move || {
                attempt_count.fetch_add(1, Ordering::SeqCst);
                operation()
            }
        },
        |error: &GeocodeError| error.is_retriable(),
    )
    .await;

    RetryOutcome {
        result,
        attempts: attempt_count.load(Ordering::SeqCst),
    }
}
