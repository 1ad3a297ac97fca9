//! Retry combinator applied uniformly to every provider call.

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use rand::Rng;

use super::RateGate;
use crate::errors::{MarketDataError, RetryClass};

/// Floor applied to provider-reported retry delays. Providers tend to
/// under-report the wait they actually enforce.
pub const DEFAULT_MIN_BACKOFF: Duration = Duration::from_secs(5);

/// Upper bound (exclusive) of the random jitter added to every backoff.
pub const DEFAULT_MAX_JITTER: Duration = Duration::from_secs(1);

/// Retries rate-limited and transient failures forever; propagates the rest.
///
/// Every attempt, including the first, goes through [`RateGate::acquire`].
/// Attempts for one call are strictly sequential.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    min_backoff: Duration,
    max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_BACKOFF)
    }
}

impl RetryPolicy {
    pub fn new(min_backoff: Duration) -> Self {
        Self {
            min_backoff,
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }

    /// Override the jitter bound. `Duration::ZERO` disables jitter.
    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Delay reported to the gate for a provider-reported `retry_after`.
    pub fn backoff_for(&self, retry_after: Duration) -> Duration {
        retry_after.max(self.min_backoff) + self.jitter()
    }

    fn jitter(&self) -> Duration {
        if self.max_jitter.is_zero() {
            return Duration::ZERO;
        }
        let fraction: f64 = rand::thread_rng().gen_range(0.0..1.0);
        self.max_jitter.mul_f64(fraction)
    }

    /// Run `op` until it succeeds or fails with a non-retryable error.
    pub async fn run<T, F, Fut>(&self, gate: &RateGate, mut op: F) -> Result<T, MarketDataError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, MarketDataError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt = next_attempt(attempt);
            gate.acquire().await;

            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            match err.retry_class() {
                RetryClass::Backoff(retry_after) => {
                    let delay = self.backoff_for(retry_after);
                    warn!(
                        "{} (attempt {}), backing off for {:?}",
                        err, attempt, delay
                    );
                    gate.report_backoff(delay);
                }
                RetryClass::Immediate => {
                    debug!("{} (attempt {}), retrying", err, attempt);
                }
                RetryClass::Never => return Err(err),
            }
        }
    }
}

/// Attempt counter for log lines. Pins at `u32::MAX`.
fn next_attempt(attempt: u32) -> u32 {
    attempt.saturating_add(1)
}
