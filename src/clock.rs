//! Time sources for the sample throttle and the one-shot formatter.
//!
//! The throttle works on a monotonic millisecond counter so wall-clock
//! adjustments never produce negative intervals. One-shot sensors stamp
//! their firings with wall time instead, which is what gets displayed.

use std::time::Instant;

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed on a monotonic counter.
    fn monotonic_ms(&self) -> u64;

    /// Milliseconds since the Unix epoch.
    fn wall_ms(&self) -> i64;
}

/// Clock backed by [`Instant`] and the system time.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn monotonic_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn wall_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_never_goes_back() {
        let clock = SystemClock::new();
        let a = clock.monotonic_ms();
        let b = clock.monotonic_ms();
        assert!(b >= a);
    }

    #[test]
    fn test_wall_clock_is_after_2020() {
        let clock = SystemClock::default();
        // 2020-01-01T00:00:00Z
        assert!(clock.wall_ms() > 1_577_836_800_000);
    }
}
