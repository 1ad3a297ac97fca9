use std::time::Duration;

use crate::utils::time_utils::duration_to_us;

/// A record written at `last_updated_us` is fresh at `now_us` iff
/// `now_us - last_updated_us <= max_age`. Never-written records are stale.
pub fn is_fresh(last_updated_us: Option<i64>, now_us: i64, max_age: Duration) -> bool {
    match last_updated_us {
        Some(last) => now_us.saturating_sub(last) <= duration_to_us(max_age),
        None => false,
    }
}
