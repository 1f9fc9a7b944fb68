//! Sensor monitoring core.
//!
//! This module turns the platform's raw sensor stream into display state:
//! a registry with one monitored sensor per type, per-sensor throttling,
//! a shared update-rate average, and a fan-out of change events to UI
//! observers.
//!
//! Everything the sensors share lives in a [`MonitorContext`] that is
//! created once per session and passed in explicitly.

pub mod descriptor;
pub mod format;
pub mod monitored;
pub mod notifier;
pub mod registry;
pub mod throttle;

pub use descriptor::{SensorDescriptor, SensorKind, SensorProfile, SensorType};
pub use format::{Reading, ValueFormat};
pub use monitored::{DISABLED_MARKER, MonitoredSensor};
pub use notifier::{ChannelObserver, Observer, SensorEventKind, SensorNotifier, UiEvent};
pub use registry::{ALL_SENSORS, SensorRegistry};
pub use throttle::{DEFAULT_UPDATE_TARGET, UI_PUSH_INTERVAL, UpdateStats};

use crate::clock::Clock;
use crate::platform::SensorPlatform;
use std::sync::Arc;

/// Session-scoped state shared by the registry and all of its sensors.
pub struct MonitorContext {
    pub platform: Arc<dyn SensorPlatform>,
    pub clock: Arc<dyn Clock>,
    pub notifier: Arc<SensorNotifier>,
    pub stats: Arc<UpdateStats>,
}

impl MonitorContext {
    /// Create a context with no observers and the default update target.
    pub fn new(platform: Arc<dyn SensorPlatform>, clock: Arc<dyn Clock>) -> Self {
        Self {
            platform,
            clock,
            notifier: Arc::new(SensorNotifier::new()),
            stats: Arc::new(UpdateStats::default()),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<SensorNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_stats(mut self, stats: Arc<UpdateStats>) -> Self {
        self.stats = stats;
        self
    }
}
