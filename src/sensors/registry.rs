//! Registry of monitored sensors, one per sensor type.

use super::{MonitorContext, MonitoredSensor, SensorNotifier, SensorType};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// Name that addresses every sensor in enable/disable requests.
pub const ALL_SENSORS: &str = "all";

/// Owns the monitored sensors for one session.
///
/// Built once from the platform's sensor list and never regenerated.
/// Dropping the registry stops listening on every sensor.
pub struct SensorRegistry {
    sensors: Vec<Arc<MonitoredSensor>>,
    context: Arc<MonitorContext>,
}

impl SensorRegistry {
    /// Enumerate the platform sensors, keeping one per type.
    ///
    /// The first sensor seen for a type is not necessarily the right one,
    /// so the platform's default sensor for that type is used instead.
    pub fn new(context: Arc<MonitorContext>) -> Self {
        let mut sensors: Vec<Arc<MonitoredSensor>> = Vec::new();

        for available in context.platform.sensor_list() {
            let sensor_type = available.sensor_type;
            if sensors.iter().any(|s| s.sensor_type() == sensor_type) {
                continue;
            }

            let descriptor = match context.platform.default_sensor(sensor_type) {
                Some(default) => default,
                None => {
                    debug!(
                        "No default sensor for type {}, using {}",
                        sensor_type, available.name
                    );
                    available
                }
            };
            let sensor = MonitoredSensor::new(descriptor, context.clone());
            debug!(
                "Monitoring sensor #{:02}: Name = '{}', Type = 0x{:x}",
                sensors.len() + 1,
                sensor.descriptor().name,
                sensor_type.code()
            );
            sensors.push(sensor);
        }

        info!("Found {} distinct sensor types", sensors.len());
        Self { sensors, context }
    }

    /// Monitored sensors in discovery order.
    pub fn sensors(&self) -> &[Arc<MonitoredSensor>] {
        &self.sensors
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn find_by_friendly_name(&self, name: &str) -> Option<&Arc<MonitoredSensor>> {
        self.sensors.iter().find(|s| s.friendly_name() == name)
    }

    pub fn find_by_type(&self, sensor_type: SensorType) -> Option<&Arc<MonitoredSensor>> {
        self.sensors.iter().find(|s| s.sensor_type() == sensor_type)
    }

    /// Enable a sensor by friendly name, or every sensor for [`ALL_SENSORS`].
    ///
    /// Returns how many sensors were affected; unknown names affect none.
    pub fn enable_sensor(&self, name: &str) -> usize {
        self.apply(name, |sensor| sensor.enable_sensor())
    }

    /// Disable a sensor by friendly name, or every sensor for [`ALL_SENSORS`].
    pub fn disable_sensor(&self, name: &str) -> usize {
        self.apply(name, |sensor| sensor.disable_sensor())
    }

    fn apply(&self, name: &str, action: impl Fn(&MonitoredSensor)) -> usize {
        if name == ALL_SENSORS {
            self.sensors.iter().for_each(|s| action(s.as_ref()));
            return self.sensors.len();
        }
        match self.find_by_friendly_name(name) {
            Some(sensor) => {
                action(sensor.as_ref());
                1
            }
            None => {
                debug!("No monitored sensor named '{}'", name);
                0
            }
        }
    }

    /// Start listening on every sensor whose enable flags allow it.
    pub fn start_sensors(&self) {
        for sensor in &self.sensors {
            sensor.start_listening();
        }
    }

    pub fn stop_sensors(&self) {
        for sensor in &self.sensors {
            sensor.stop_listening();
        }
    }

    /// Set the minimum time between accepted samples of one sensor. Zero disables throttling.
    pub fn set_update_target(&self, target: Duration) {
        debug!("Update target set to {:?}", target);
        self.context.stats.set_target(target);
    }

    pub fn update_target(&self) -> Duration {
        self.context.stats.target()
    }

    /// Observed average time between same-sensor updates.
    pub fn actual_update_interval(&self) -> Option<Duration> {
        self.context.stats.average()
    }

    pub fn notifier(&self) -> &Arc<SensorNotifier> {
        &self.context.notifier
    }

    pub fn context(&self) -> &Arc<MonitorContext> {
        &self.context
    }
}

impl Drop for SensorRegistry {
    fn drop(&mut self) {
        self.stop_sensors();
    }
}
