//! Boundary to the platform sensor service.
//!
//! The platform enumerates physical sensors and delivers raw samples to
//! registered listeners. Delivery happens on a platform-owned context,
//! never on the UI task, so listeners must only touch state that is safe
//! to share across threads.

use crate::error::Result;
use crate::sensors::{SensorDescriptor, SensorType};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// One raw event from a physical sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub sensor_type: SensorType,
    /// Platform timestamp in nanoseconds.
    pub timestamp_ns: i64,
    pub values: Vec<f32>,
}

/// Requested delivery rate for continuous subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryRate {
    /// As fast as the sensor can produce samples.
    Fastest,
    Game,
    Ui,
    Normal,
}

impl DeliveryRate {
    /// Nominal period between samples; `Fastest` defers to the sensor's own minimum delay.
    pub fn nominal_period(self, min_delay: Duration) -> Duration {
        match self {
            DeliveryRate::Fastest => min_delay,
            DeliveryRate::Game => Duration::from_millis(20).max(min_delay),
            DeliveryRate::Ui => Duration::from_millis(66).max(min_delay),
            DeliveryRate::Normal => Duration::from_millis(200).max(min_delay),
        }
    }
}

/// How samples are delivered for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Stream samples until unsubscribed.
    Continuous(DeliveryRate),
    /// Deliver a single event, after which the subscription no longer exists.
    OneShot,
}

/// Handle for an active subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Receives raw samples from the platform.
pub trait SampleListener: Send + Sync {
    fn on_sample(&self, sample: &RawSample);
}

/// Platform sensor service.
pub trait SensorPlatform: Send + Sync {
    /// Every sensor the platform exposes, possibly several per type.
    fn sensor_list(&self) -> Vec<SensorDescriptor>;

    /// The designated default sensor for a type.
    fn default_sensor(&self, sensor_type: SensorType) -> Option<SensorDescriptor>;

    /// Start delivering samples of `sensor` to `listener`.
    ///
    /// Implementations must not hold internal locks while invoking
    /// listeners: a one-shot listener re-subscribes from inside its callback.
    fn subscribe(
        &self,
        sensor: &SensorDescriptor,
        mode: DeliveryMode,
        listener: Arc<dyn SampleListener>,
    ) -> Result<SubscriptionId>;

    /// Cancel a subscription. Unknown or already finished ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}
