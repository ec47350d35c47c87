//! Wall-clock source for card timestamps.

use chrono::Utc;

/// Millisecond clock used to stamp `created_at`/`updated_at`.
pub trait Clock {
    /// Returns current Unix epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Returns a timestamp strictly after `previous`, preferring `now`.
///
/// Keeps `updated_at` monotonic when several mutations land in the same
/// millisecond or the wall clock steps backwards.
pub fn next_after(now: i64, previous: i64) -> i64 {
    now.max(previous.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::{next_after, Clock, SystemClock};

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }

    #[test]
    fn next_after_is_strictly_greater() {
        assert_eq!(next_after(500, 100), 500);
        assert_eq!(next_after(100, 100), 101);
        assert_eq!(next_after(50, 100), 101);
    }
}
