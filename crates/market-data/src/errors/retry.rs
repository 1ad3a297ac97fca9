use std::time::Duration;

/// Classification for retry policy.
///
/// Used by [`RetryPolicy`](crate::limiter::RetryPolicy) to decide how to
/// respond to a failed provider call.
///
/// # Behavior Summary
///
/// | Class | Retry? | Extra delay |
/// |-------|--------|-------------|
/// | `Backoff(d)` | Yes, forever | `max(d, min_backoff)` plus jitter, reported to the rate gate |
/// | `Immediate` | Yes, forever | None beyond normal rate gate spacing |
/// | `Never` | No | - |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// The provider asked us to slow down. The delay is what the provider
    /// reported; the policy enforces its own floor on top.
    Backoff(Duration),

    /// Transient failure such as a read timeout.
    Immediate,

    /// Terminal for this attempt; surfaced to the caller unmodified.
    Never,
}
