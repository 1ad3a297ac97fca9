//! Global minimum-spacing throttle for provider requests.
//!
//! Provider limits are per API key, so every dataset refresh shares one gate.
//! The gate guards a single "next eligible" instant. Granting a permit
//! advances it by one interval; a backoff report only ever pushes it later.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;

/// Default pacing when no valid rate is configured.
pub const DEFAULT_REQUESTS_PER_MINUTE: f64 = 300.0;

/// Proof that the caller was granted a request slot.
#[derive(Clone, Copy, Debug)]
pub struct RatePermit {
    granted_at: Instant,
}

impl RatePermit {
    /// Monotonic instant at which the slot was granted.
    pub fn granted_at(&self) -> Instant {
        self.granted_at
    }
}

/// Serializes outbound requests to at most one per `interval`.
///
/// Waiters queue in FIFO order. Whoever is at the head of the queue re-reads
/// the next eligible instant after every sleep, so a backoff reported while
/// it waits is honoured.
pub struct RateGate {
    interval: Duration,
    /// Next instant at which a permit may be granted.
    next_eligible: Mutex<Instant>,
    /// FIFO queue of waiters; only the head polls `next_eligible`.
    queue: tokio::sync::Mutex<()>,
}

impl RateGate {
    /// Create a gate spacing requests `60s / requests_per_minute` apart.
    pub fn new(requests_per_minute: f64) -> Self {
        let rpm = if requests_per_minute.is_finite() && requests_per_minute > 0.0 {
            requests_per_minute
        } else {
            warn!(
                "Invalid requests_per_minute {}, falling back to {}",
                requests_per_minute, DEFAULT_REQUESTS_PER_MINUTE
            );
            DEFAULT_REQUESTS_PER_MINUTE
        };
        Self::with_interval(Duration::from_secs_f64(60.0 / rpm))
    }

    /// Create a gate with an explicit minimum spacing.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            next_eligible: Mutex::new(Instant::now()),
            queue: tokio::sync::Mutex::new(()),
        }
    }

    /// Minimum spacing between two granted permits.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Lock the next-eligible instant, recovering from poison if necessary.
    ///
    /// The guarded value is a plain instant, so a poisoned lock still holds
    /// a usable value.
    fn lock_next(&self) -> MutexGuard<'_, Instant> {
        self.next_eligible.lock().unwrap_or_else(|poisoned| {
            warn!("Rate gate mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Wait until a request slot is available and claim it.
    pub async fn acquire(&self) -> RatePermit {
        let _turn = self.queue.lock().await;
        loop {
            let wait_time = {
                let mut next = self.lock_next();
                let now = Instant::now();
                if now >= *next {
                    *next = now + self.interval;
                    return RatePermit { granted_at: now };
                }
                *next - now
            };

            debug!("Rate gate: waiting {:?} for next slot", wait_time);
            tokio::time::sleep(wait_time).await;
        }
    }

    /// Push the next eligible instant to at least `now + delay`.
    ///
    /// Never moves it earlier: a shorter delay reported after a longer one
    /// leaves the longer wait in place.
    pub fn report_backoff(&self, delay: Duration) {
        let mut next = self.lock_next();
        let candidate = Instant::now() + delay;
        if candidate > *next {
            debug!("Rate gate: backing off for {:?}", delay);
            *next = candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_interval_from_requests_per_minute() {
        let gate = RateGate::new(300.0);
        assert_eq!(gate.interval(), Duration::from_millis(200));

        let gate = RateGate::new(60.0);
        assert_eq!(gate.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_rate_falls_back_to_default() {
        let expected = Duration::from_secs_f64(60.0 / DEFAULT_REQUESTS_PER_MINUTE);
        assert_eq!(RateGate::new(0.0).interval(), expected);
        assert_eq!(RateGate::new(-5.0).interval(), expected);
        assert_eq!(RateGate::new(f64::NAN).interval(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_grants_are_spaced() {
        let gate = RateGate::with_interval(Duration::from_millis(100));

        let mut grants = Vec::new();
        for _ in 0..5 {
            grants.push(gate.acquire().await.granted_at());
        }

        for pair in grants.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(100));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_grants_are_serialized() {
        let gate = Arc::new(RateGate::with_interval(Duration::from_millis(250)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = gate.clone();
                tokio::spawn(async move { gate.acquire().await.granted_at() })
            })
            .collect();

        let mut grants = Vec::new();
        for handle in handles {
            grants.push(handle.await.unwrap());
        }
        grants.sort();

        for pair in grants.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(250));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_delays_next_grant() {
        let gate = RateGate::with_interval(Duration::from_millis(10));
        let start = gate.acquire().await.granted_at();

        gate.report_backoff(Duration::from_secs(5));
        let next = gate.acquire().await.granted_at();

        assert!(next - start >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shorter_backoff_does_not_shorten_wait() {
        let gate = RateGate::with_interval(Duration::from_millis(10));
        let start = Instant::now();

        gate.report_backoff(Duration::from_secs(10));
        gate.report_backoff(Duration::from_secs(1));
        let granted = gate.acquire().await.granted_at();

        assert!(granted - start >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_reported_while_waiting_is_honoured() {
        let gate = Arc::new(RateGate::with_interval(Duration::from_secs(1)));
        let start = gate.acquire().await.granted_at();

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.acquire().await.granted_at() })
        };
        tokio::time::sleep(Duration::from_millis(500)).await;
        gate.report_backoff(Duration::from_secs(3));

        let granted = waiter.await.unwrap();
        assert!(granted - start >= Duration::from_millis(3500));
    }
}
