//! Retry backoff for failing update cycles

use std::time::Duration;

/// Delay before the next cycle after `consecutive_errors` straight failures.
///
/// Linear in the failure count and capped, so a dead source settles at a
/// steady retry rate instead of growing unbounded.
pub(crate) fn backoff_delay(consecutive_errors: u32, base: Duration, cap: Duration) -> Duration {
    cap.min(base.saturating_mul(consecutive_errors))
}
