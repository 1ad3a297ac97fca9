//! Request pacing for the data provider.
//!
//! - [`RateGate`]: single global throttle shared by every concurrent fetch
//! - [`RetryPolicy`]: retry combinator driven by [`RetryClass`](crate::errors::RetryClass)

mod rate_gate;
mod retry_policy;

pub use rate_gate::{RateGate, RatePermit, DEFAULT_REQUESTS_PER_MINUTE};
pub use retry_policy::{RetryPolicy, DEFAULT_MAX_JITTER, DEFAULT_MIN_BACKOFF};
