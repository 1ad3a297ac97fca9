use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Wall-clock source for freshness timestamps, in microseconds since the
/// Unix epoch.
///
/// Request spacing does not use this clock; the rate gate runs on
/// `tokio::time::Instant`.
pub trait Clock: Send + Sync {
    fn now_us(&self) -> i64;

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(self.now_us()).unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_us(&self) -> i64 {
        Utc::now().timestamp_micros()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_us: AtomicI64,
}

impl ManualClock {
    pub fn new(now_us: i64) -> Self {
        Self {
            now_us: AtomicI64::new(now_us),
        }
    }

    pub fn set(&self, now_us: i64) {
        self.now_us.store(now_us, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.now_us
            .fetch_add(duration_to_us(by), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> i64 {
        self.now_us.load(Ordering::SeqCst)
    }
}

/// Saturating conversion to whole microseconds.
pub fn duration_to_us(duration: Duration) -> i64 {
    i64::try_from(duration.as_micros()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(1_000);
        clock.advance(Duration::from_millis(2));
        assert_eq!(clock.now_us(), 3_000);
        clock.set(10);
        assert_eq!(clock.now_us(), 10);
    }

    #[test]
    fn test_system_clock_is_microseconds() {
        let before = Utc::now().timestamp_micros();
        let now = SystemClock.now_us();
        assert!(now >= before);

        let clock = ManualClock::new(1_500_000);
        assert_eq!(clock.now().timestamp(), 1);
    }

    #[test]
    fn test_duration_to_us_saturates() {
        assert_eq!(duration_to_us(Duration::from_secs(1)), 1_000_000);
        assert_eq!(duration_to_us(Duration::MAX), i64::MAX);
    }
}
