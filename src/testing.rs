//! Test doubles shared by the unit tests.

use crate::clock::Clock;
use crate::error::{MonitorError, Result};
use crate::platform::{DeliveryMode, RawSample, SampleListener, SensorPlatform, SubscriptionId};
use crate::sensors::{
    MonitorContext, MonitoredSensor, Observer, SensorDescriptor, SensorNotifier, SensorRegistry,
    SensorType, UpdateStats,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Clock that only moves when told to.
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn monotonic_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn wall_ms(&self) -> i64 {
        1_700_000_000_000 + self.now_ms.load(Ordering::SeqCst) as i64
    }
}

/// Manual clock that runs a one-time hook the next time the monotonic time is read.
pub struct HookClock {
    inner: ManualClock,
    hook: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl HookClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            inner: ManualClock::new(start_ms),
            hook: Mutex::new(None),
        }
    }

    pub fn set_hook(&self, hook: impl FnOnce() + Send + 'static) {
        *self.hook.lock() = Some(Box::new(hook));
    }
}

impl Clock for HookClock {
    fn monotonic_ms(&self) -> u64 {
        let hook = self.hook.lock().take();
        if let Some(hook) = hook {
            hook();
        }
        self.inner.monotonic_ms()
    }

    fn wall_ms(&self) -> i64 {
        self.inner.wall_ms()
    }
}

struct ActiveSubscription {
    id: SubscriptionId,
    sensor_type: SensorType,
    mode: DeliveryMode,
    listener: Arc<dyn SampleListener>,
}

#[derive(Default)]
struct PlatformState {
    next_id: u64,
    active: Vec<ActiveSubscription>,
    subscribed: Vec<SensorType>,
}

/// Platform that records subscriptions and delivers samples on demand.
pub struct RecordingPlatform {
    sensors: Vec<SensorDescriptor>,
    defaults: HashMap<SensorType, SensorDescriptor>,
    reject: bool,
    state: Mutex<PlatformState>,
}

impl RecordingPlatform {
    pub fn new(sensors: &[(i32, &str)]) -> Self {
        Self {
            sensors: sensors
                .iter()
                .map(|(code, name)| SensorDescriptor::new(SensorType(*code), *name))
                .collect(),
            defaults: HashMap::new(),
            reject: false,
            state: Mutex::new(PlatformState::default()),
        }
    }

    /// A platform that refuses every subscription.
    pub fn rejecting(sensors: &[(i32, &str)]) -> Self {
        Self {
            reject: true,
            ..Self::new(sensors)
        }
    }

    pub fn with_default(mut self, descriptor: SensorDescriptor) -> Self {
        self.defaults.insert(descriptor.sensor_type, descriptor);
        self
    }

    /// Deliver a sample to every subscriber of `sensor_type`. Returns how many got it.
    pub fn emit(&self, sensor_type: SensorType, values: &[f32]) -> usize {
        self.emit_with_timestamp(sensor_type, 0, values)
    }

    pub fn emit_with_timestamp(
        &self,
        sensor_type: SensorType,
        timestamp_ns: i64,
        values: &[f32],
    ) -> usize {
        let listeners: Vec<Arc<dyn SampleListener>> = {
            let mut state = self.state.lock();
            let listeners = state
                .active
                .iter()
                .filter(|s| s.sensor_type == sensor_type)
                .map(|s| s.listener.clone())
                .collect();
            state
                .active
                .retain(|s| s.sensor_type != sensor_type || s.mode != DeliveryMode::OneShot);
            listeners
        };

        let sample = RawSample {
            sensor_type,
            timestamp_ns,
            values: values.to_vec(),
        };
        for listener in &listeners {
            listener.on_sample(&sample);
        }
        listeners.len()
    }

    /// Listeners currently subscribed to `sensor_type`, in subscription order.
    pub fn listeners(&self, sensor_type: SensorType) -> Vec<Arc<dyn SampleListener>> {
        self.state
            .lock()
            .active
            .iter()
            .filter(|s| s.sensor_type == sensor_type)
            .map(|s| s.listener.clone())
            .collect()
    }

    pub fn active_count(&self, sensor_type: SensorType) -> usize {
        self.state
            .lock()
            .active
            .iter()
            .filter(|s| s.sensor_type == sensor_type)
            .count()
    }

    pub fn total_active(&self) -> usize {
        self.state.lock().active.len()
    }

    /// How many subscribe calls were accepted for `sensor_type`.
    pub fn subscribe_count(&self, sensor_type: SensorType) -> usize {
        self.state
            .lock()
            .subscribed
            .iter()
            .filter(|t| **t == sensor_type)
            .count()
    }
}

impl SensorPlatform for RecordingPlatform {
    fn sensor_list(&self) -> Vec<SensorDescriptor> {
        self.sensors.clone()
    }

    fn default_sensor(&self, sensor_type: SensorType) -> Option<SensorDescriptor> {
        self.defaults.get(&sensor_type).cloned().or_else(|| {
            self.sensors
                .iter()
                .find(|s| s.sensor_type == sensor_type)
                .cloned()
        })
    }

    fn subscribe(
        &self,
        sensor: &SensorDescriptor,
        mode: DeliveryMode,
        listener: Arc<dyn SampleListener>,
    ) -> Result<SubscriptionId> {
        if self.reject {
            return Err(MonitorError::SubscriptionRejected(sensor.sensor_type.code()));
        }
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = SubscriptionId(state.next_id);
        state.active.push(ActiveSubscription {
            id,
            sensor_type: sensor.sensor_type,
            mode,
            listener,
        });
        state.subscribed.push(sensor.sensor_type);
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.state.lock().active.retain(|s| s.id != id);
    }
}

/// Observer that records `label:kind:friendly-name` entries.
pub struct RecordingObserver {
    label: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl Default for RecordingObserver {
    fn default() -> Self {
        Self::with_log("observer", Arc::new(Mutex::new(Vec::new())))
    }
}

impl RecordingObserver {
    pub fn with_log(label: &'static str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self { label, log }
    }

    pub fn events(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn state_events(&self) -> usize {
        self.count(":state:")
    }

    pub fn value_events(&self) -> usize {
        self.count(":value:")
    }

    fn count(&self, marker: &str) -> usize {
        self.log.lock().iter().filter(|e| e.contains(marker)).count()
    }

    fn record(&self, kind: &str, sensor: &MonitoredSensor) {
        self.log
            .lock()
            .push(format!("{}:{}:{}", self.label, kind, sensor.friendly_name()));
    }
}

impl Observer for RecordingObserver {
    fn on_state_changed(&self, sensor: &MonitoredSensor) {
        self.record("state", sensor);
    }

    fn on_value_changed(&self, sensor: &MonitoredSensor) {
        self.record("value", sensor);
    }
}

pub struct Fixture {
    pub platform: Arc<RecordingPlatform>,
    pub clock: Arc<ManualClock>,
    pub notifier: Arc<SensorNotifier>,
    pub stats: Arc<UpdateStats>,
    pub registry: SensorRegistry,
}

/// Registry over a recording platform exposing `sensors` as `(type code, name)`.
pub fn fixture(sensors: &[(i32, &str)]) -> Fixture {
    fixture_with(RecordingPlatform::new(sensors))
}

pub fn fixture_with(platform: RecordingPlatform) -> Fixture {
    let platform = Arc::new(platform);
    let clock = Arc::new(ManualClock::new(10_000));
    let context = MonitorContext::new(platform.clone(), clock.clone());
    let notifier = context.notifier.clone();
    let stats = context.stats.clone();
    let registry = SensorRegistry::new(Arc::new(context));
    Fixture {
        platform,
        clock,
        notifier,
        stats,
        registry,
    }
}
