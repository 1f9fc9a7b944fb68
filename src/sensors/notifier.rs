//! Sensor change notifier for UI listeners.
//!
//! When sensors change state or value, every registered observer is told
//! immediately. Observers are called on the platform delivery context, so
//! anything that owns UI state should register a [`ChannelObserver`] and
//! apply the events from its own task.

use super::MonitoredSensor;
use super::SensorType;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Kind of change published to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorEventKind {
    /// The platform enabled or disabled the sensor.
    StateChanged,
    /// A new value is ready for display.
    ValueChanged,
}

/// Receives sensor change notifications.
pub trait Observer: Send + Sync {
    fn on_state_changed(&self, sensor: &MonitoredSensor);

    fn on_value_changed(&self, sensor: &MonitoredSensor);
}

/// Fans sensor events out to every registered observer.
///
/// Observers are identified by their `Arc` allocation; registering the
/// same observer twice has no effect.
#[derive(Default)]
pub struct SensorNotifier {
    observers: RwLock<Vec<Arc<dyn Observer>>>,
}

impl SensorNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer unless it is already registered.
    pub fn register(&self, observer: Arc<dyn Observer>) {
        let mut observers = self.observers.write();
        if !observers.iter().any(|o| Arc::ptr_eq(o, &observer)) {
            observers.push(observer);
        }
    }

    /// Remove an observer if present.
    pub fn unregister(&self, observer: &Arc<dyn Observer>) {
        self.observers.write().retain(|o| !Arc::ptr_eq(o, observer));
    }

    pub fn has_listeners(&self) -> bool {
        !self.observers.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_listeners()
    }

    /// Deliver an event to every observer, in registration order.
    ///
    /// Events published while nobody listens are dropped.
    pub fn publish(&self, kind: SensorEventKind, sensor: &MonitoredSensor) {
        // Snapshot so observers may (un)register from inside a callback.
        let observers = self.observers.read().clone();
        for observer in &observers {
            match kind {
                SensorEventKind::StateChanged => observer.on_state_changed(sensor),
                SensorEventKind::ValueChanged => observer.on_value_changed(sensor),
            }
        }
    }
}

/// Event handed over to the UI task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiEvent {
    pub kind: SensorEventKind,
    pub sensor_type: SensorType,
}

/// Observer that forwards events onto a channel drained by the UI task.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl ChannelObserver {
    /// Create the observer and the receiving end for the UI task.
    pub fn channel() -> (Arc<Self>, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }

    fn forward(&self, kind: SensorEventKind, sensor: &MonitoredSensor) {
        let event = UiEvent {
            kind,
            sensor_type: sensor.sensor_type(),
        };
        if self.tx.send(event).is_err() {
            log::trace!("UI channel closed, dropping {:?}", event);
        }
    }
}

impl Observer for ChannelObserver {
    fn on_state_changed(&self, sensor: &MonitoredSensor) {
        self.forward(SensorEventKind::StateChanged, sensor);
    }

    fn on_value_changed(&self, sensor: &MonitoredSensor) {
        self.forward(SensorEventKind::ValueChanged, sensor);
    }
}
