//! Sample throttling and update-rate averaging.
//!
//! Two independent gates sit in front of every continuous sample:
//! the configurable target interval decides whether a sample is trusted
//! and averaged at all, and a fixed ceiling decides whether the UI gets
//! to repaint for it.

use parking_lot::Mutex;
use std::time::Duration;

/// Minimum time between two value-changed notifications for one sensor.
pub const UI_PUSH_INTERVAL: Duration = Duration::from_millis(250);

/// Target interval used until the user picks a rate (20 Hz).
pub const DEFAULT_UPDATE_TARGET: Duration = Duration::from_millis(1000 / 20);

/// Statistics shared by every monitored sensor.
///
/// Sensors report from the platform delivery context, possibly from
/// several threads at once, so the running average and the target are
/// kept behind one lock.
pub struct UpdateStats {
    inner: Mutex<StatsInner>,
}

struct StatsInner {
    average: Option<Duration>,
    target: Duration,
}

impl UpdateStats {
    pub fn new(target: Duration) -> Self {
        Self {
            inner: Mutex::new(StatsInner {
                average: None,
                target,
            }),
        }
    }

    /// Minimum interval between accepted samples of one sensor. Zero disables throttling.
    pub fn target(&self) -> Duration {
        self.inner.lock().target
    }

    pub fn set_target(&self, target: Duration) {
        self.inner.lock().target = target;
    }

    /// Running average of the delay between accepted samples, if any were averaged yet.
    pub fn average(&self) -> Option<Duration> {
        self.inner.lock().average
    }

    /// Decide whether a sample arriving `elapsed` after the previous accepted one is kept.
    ///
    /// The first sample of a sensor has no `elapsed` and is always kept
    /// without touching the average.
    pub fn accept(&self, elapsed: Option<Duration>) -> bool {
        let Some(elapsed) = elapsed else {
            return true;
        };

        let mut inner = self.inner.lock();
        if !inner.target.is_zero() && elapsed < inner.target {
            return false;
        }
        inner.average = Some(match inner.average {
            Some(average) => (average + elapsed) / 2,
            None => elapsed,
        });
        true
    }
}

impl Default for UpdateStats {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_TARGET)
    }
}

/// Per-sensor timestamps for both gates, in monotonic milliseconds.
#[derive(Debug, Default)]
pub struct SampleThrottle {
    last_sample_ms: Option<u64>,
    last_push_ms: Option<u64>,
}

impl SampleThrottle {
    /// Apply the target-interval gate and feed the shared average.
    pub fn admit(&mut self, now_ms: u64, stats: &UpdateStats) -> bool {
        let elapsed = self
            .last_sample_ms
            .map(|last| Duration::from_millis(now_ms.saturating_sub(last)));
        if !stats.accept(elapsed) {
            return false;
        }
        self.last_sample_ms = Some(now_ms);
        true
    }

    /// Apply the UI ceiling. Records the push when it is allowed.
    pub fn should_push(&mut self, now_ms: u64) -> bool {
        if let Some(last) = self.last_push_ms
            && Duration::from_millis(now_ms.saturating_sub(last)) < UI_PUSH_INTERVAL
        {
            return false;
        }
        self.last_push_ms = Some(now_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_average_halves_towards_each_new_sample() {
        let stats = UpdateStats::new(Duration::ZERO);
        assert_eq!(stats.average(), None);

        assert!(stats.accept(Some(ms(40))));
        assert_eq!(stats.average(), Some(ms(40)));

        assert!(stats.accept(Some(ms(60))));
        assert_eq!(stats.average(), Some(ms(50)));

        assert!(stats.accept(Some(ms(30))));
        assert_eq!(stats.average(), Some(ms(40)));
    }

    #[test]
    fn test_first_sample_does_not_touch_average() {
        let stats = UpdateStats::new(ms(20));
        assert!(stats.accept(None));
        assert_eq!(stats.average(), None);
    }

    #[test]
    fn test_samples_faster_than_target_are_dropped() {
        let stats = UpdateStats::new(ms(40));
        let mut throttle = SampleThrottle::default();

        assert!(throttle.admit(1_000, &stats));
        assert!(!throttle.admit(1_010, &stats));
        assert!(!throttle.admit(1_039, &stats));
        assert_eq!(stats.average(), None);

        // Elapsed is measured from the last accepted sample, not the last arrival.
        assert!(throttle.admit(1_040, &stats));
        assert_eq!(stats.average(), Some(ms(40)));

        assert!(throttle.admit(1_140, &stats));
        assert_eq!(stats.average(), Some(ms(70)));
    }

    #[test]
    fn test_zero_target_accepts_everything() {
        let stats = UpdateStats::new(Duration::ZERO);
        let mut throttle = SampleThrottle::default();
        for now in [0, 1, 2, 3] {
            assert!(throttle.admit(now, &stats));
        }
        assert_eq!(stats.average(), Some(ms(1)));
    }

    #[test]
    fn test_ui_push_ceiling() {
        let mut throttle = SampleThrottle::default();
        assert!(throttle.should_push(10_000));
        assert!(!throttle.should_push(10_100));
        assert!(!throttle.should_push(10_249));
        assert!(throttle.should_push(10_250));
        assert!(!throttle.should_push(10_251));
    }

    #[test]
    fn test_target_can_change_at_runtime() {
        let stats = UpdateStats::default();
        assert_eq!(stats.target(), ms(50));
        stats.set_target(ms(20));
        assert_eq!(stats.target(), ms(20));
    }
}
