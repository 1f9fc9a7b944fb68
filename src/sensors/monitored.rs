//! A physical sensor under monitoring.
//!
//! Listening is gated by two flags: the platform decides whether the
//! sensor is available (`enabled_by_app`) and the user decides whether
//! to watch it (`enabled_by_user`). A subscription only exists while
//! both are set.
//!
//! One-shot sensors are driven through an explicit state machine: a
//! firing moves the subscription from `Armed` to `Fired`, and the handler
//! re-issues the one-shot request to get back to `Armed`.

use super::descriptor::{SensorDescriptor, SensorKind, SensorProfile, SensorType};
use super::format::Reading;
use super::notifier::SensorEventKind;
use super::throttle::SampleThrottle;
use super::MonitorContext;
use crate::platform::{DeliveryMode, DeliveryRate, RawSample, SampleListener, SubscriptionId};
use log::{debug, trace, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Value shown while the platform has the sensor disabled.
pub const DISABLED_MARKER: &str = "Disabled by platform";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subscription {
    Idle,
    Streaming(Lease),
    /// One-shot request outstanding.
    Armed(Lease),
    /// One-shot of the given generation delivered, re-arm pending.
    Fired(u64),
}

/// A platform subscription and the listener generation it delivers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Lease {
    id: SubscriptionId,
    generation: u64,
}

#[derive(Debug, Default)]
struct DisplayState {
    reading: Reading,
    /// Formatted value, `None` when it must be re-rendered.
    cached: Option<String>,
}

/// Thread-safe wrapper around one physical sensor.
///
/// Mutated from the platform delivery context (samples) and from the
/// UI (toggles, enable/disable), so every piece of state is behind an
/// atomic or a lock. No lock is held while observers run.
pub struct MonitoredSensor {
    descriptor: SensorDescriptor,
    kind: SensorKind,
    profile: SensorProfile,
    enabled_by_app: AtomicBool,
    enabled_by_user: AtomicBool,
    display: Mutex<DisplayState>,
    throttle: Mutex<SampleThrottle>,
    subscription: Mutex<Subscription>,
    /// Bumped for every subscribe; samples from older listeners are dropped.
    generation: AtomicU64,
    context: Arc<MonitorContext>,
    this: Weak<MonitoredSensor>,
}

impl MonitoredSensor {
    /// Wrap a platform sensor. Starts disabled by the platform and enabled by the user.
    pub fn new(descriptor: SensorDescriptor, context: Arc<MonitorContext>) -> Arc<Self> {
        let kind = descriptor.sensor_type.kind();
        if kind == SensorKind::Unknown {
            debug!(
                "Unknown sensor type {} for sensor {}",
                descriptor.sensor_type, descriptor.name
            );
        }
        Arc::new_cyclic(|this| Self {
            profile: kind.profile(),
            kind,
            descriptor,
            enabled_by_app: AtomicBool::new(false),
            enabled_by_user: AtomicBool::new(true),
            display: Mutex::new(DisplayState::default()),
            throttle: Mutex::new(SampleThrottle::default()),
            subscription: Mutex::new(Subscription::Idle),
            generation: AtomicU64::new(0),
            context,
            this: this.clone(),
        })
    }

    pub fn descriptor(&self) -> &SensorDescriptor {
        &self.descriptor
    }

    pub fn sensor_type(&self) -> SensorType {
        self.descriptor.sensor_type
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn ui_name(&self) -> &'static str {
        self.profile.ui_name
    }

    pub fn friendly_name(&self) -> &'static str {
        self.profile.friendly_name
    }

    /// Descriptor details for the info panel.
    pub fn info(&self) -> String {
        self.descriptor.info()
    }

    pub fn is_enabled_by_app(&self) -> bool {
        self.enabled_by_app.load(Ordering::SeqCst)
    }

    pub fn is_enabled_by_user(&self) -> bool {
        self.enabled_by_user.load(Ordering::SeqCst)
    }

    /// Whether a platform subscription is currently held.
    pub fn is_listening(&self) -> bool {
        !matches!(*self.subscription.lock(), Subscription::Idle)
    }

    /// Current display value, rendered on demand and cached until the next change.
    pub fn value(&self) -> String {
        let mut display = self.display.lock();
        let DisplayState { reading, cached } = &mut *display;
        cached
            .get_or_insert_with(|| self.profile.format.render(reading))
            .clone()
    }

    /// Latest raw components kept for display.
    pub fn reading(&self) -> Reading {
        self.display.lock().reading
    }

    /// The platform made this sensor available.
    ///
    /// Does not subscribe by itself; listening starts with
    /// [`start_listening`](Self::start_listening).
    pub fn enable_sensor(&self) {
        debug!(">>> Sensor {} is enabled.", self.friendly_name());
        self.enabled_by_app.store(true, Ordering::SeqCst);
        self.display.lock().cached = None;
        self.context
            .notifier
            .publish(SensorEventKind::StateChanged, self);
    }

    /// The platform withdrew this sensor.
    pub fn disable_sensor(&self) {
        debug!("<<< Sensor {} is disabled.", self.friendly_name());
        self.enabled_by_app.store(false, Ordering::SeqCst);
        self.display.lock().cached = Some(DISABLED_MARKER.to_string());
        self.stop_listening();
        self.context
            .notifier
            .publish(SensorEventKind::StateChanged, self);
    }

    /// The user checked or unchecked the sensor.
    pub fn on_user_toggle(&self, checked: bool) {
        self.enabled_by_user.store(checked, Ordering::SeqCst);
        if checked {
            self.start_listening();
        } else {
            self.stop_listening();
        }
    }

    /// Subscribe to raw events if both enable flags are set and nothing is held yet.
    pub fn start_listening(&self) {
        if !(self.is_enabled_by_app() && self.is_enabled_by_user()) {
            return;
        }

        let mut subscription = self.subscription.lock();
        if *subscription != Subscription::Idle {
            return;
        }
        let mode = if self.kind.is_one_shot() {
            DeliveryMode::OneShot
        } else {
            DeliveryMode::Continuous(DeliveryRate::Fastest)
        };
        *subscription = self.subscribe(mode);
        if *subscription != Subscription::Idle {
            debug!("+++ Sensor {} is started.", self.friendly_name());
        }
    }

    /// Drop the platform subscription if one is held. Idempotent.
    pub fn stop_listening(&self) {
        let previous = std::mem::replace(&mut *self.subscription.lock(), Subscription::Idle);
        match previous {
            Subscription::Streaming(lease) | Subscription::Armed(lease) => {
                self.context.platform.unsubscribe(lease.id);
                debug!("--- Sensor {} is stopped.", self.friendly_name());
            }
            Subscription::Fired(_) => {
                debug!("--- Sensor {} is stopped.", self.friendly_name());
            }
            Subscription::Idle => {}
        }
    }

    fn subscribe(&self, mode: DeliveryMode) -> Subscription {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let listener = Arc::new(SensorListener {
            sensor: self.this.clone(),
            generation,
        });
        match self
            .context
            .platform
            .subscribe(&self.descriptor, mode, listener)
        {
            Ok(id) => {
                let lease = Lease { id, generation };
                match mode {
                    DeliveryMode::OneShot => Subscription::Armed(lease),
                    DeliveryMode::Continuous(_) => Subscription::Streaming(lease),
                }
            }
            Err(e) => {
                warn!("Sensor {} could not be started: {}", self.friendly_name(), e);
                Subscription::Idle
            }
        }
    }

    /// Whether a continuous subscription issued as `generation` is still held.
    fn is_streaming(&self, generation: u64) -> bool {
        matches!(
            *self.subscription.lock(),
            Subscription::Streaming(lease) if lease.generation == generation
        )
    }

    /// Entry point for raw samples delivered to the subscription issued as `generation`.
    fn handle_sample(&self, generation: u64, sample: &RawSample) {
        if self.kind.is_one_shot() {
            self.handle_trigger(generation, sample);
        } else {
            self.handle_stream_sample(generation, sample);
        }
    }

    fn handle_stream_sample(&self, generation: u64, sample: &RawSample) {
        if !self.is_streaming(generation) {
            trace!("Late sample for stopped sensor {}", self.friendly_name());
            return;
        }

        let now = self.context.clock.monotonic_ms();
        let push = {
            let mut throttle = self.throttle.lock();
            if !throttle.admit(now, &self.context.stats) {
                trace!("Sensor {} sample arrived too fast", self.friendly_name());
                return;
            }
            self.context.notifier.has_listeners() && throttle.should_push(now)
        };
        if !push {
            return;
        }

        {
            let mut display = self.display.lock();
            // disable_sensor clears the flag before it takes this lock.
            if !self.is_enabled_by_app() || !self.is_streaming(generation) {
                trace!("Sensor {} stopped while sample was in flight", self.friendly_name());
                return;
            }
            display.reading.copy_components(&sample.values);
            display.cached = None;
        }
        self.context
            .notifier
            .publish(SensorEventKind::ValueChanged, self);
    }

    fn handle_trigger(&self, generation: u64, sample: &RawSample) {
        {
            let mut subscription = self.subscription.lock();
            match *subscription {
                Subscription::Armed(lease) if lease.generation == generation => {
                    *subscription = Subscription::Fired(generation);
                }
                _ => {
                    trace!("Stray trigger for sensor {}", self.friendly_name());
                    return;
                }
            }
        }

        {
            let mut display = self.display.lock();
            if self.is_enabled_by_app() {
                display.reading.values[0] = sample.values.first().copied().unwrap_or_default();
                display.reading.wall_ms = self.context.clock.wall_ms();
                display.reading.timestamp_ns = sample.timestamp_ns;
                display.cached = None;
            }
        }
        if self.is_enabled_by_app() {
            self.context
                .notifier
                .publish(SensorEventKind::ValueChanged, self);
        }

        self.rearm(generation);
    }

    fn rearm(&self, generation: u64) {
        let mut subscription = self.subscription.lock();
        // stop_listening may have run while observers were notified.
        if *subscription == Subscription::Fired(generation) {
            *subscription = self.subscribe(DeliveryMode::OneShot);
        }
    }
}

/// Listener handed to the platform; holds the sensor weakly so the
/// platform never keeps a dropped registry alive.
struct SensorListener {
    sensor: Weak<MonitoredSensor>,
    /// Subscription this listener was issued for.
    generation: u64,
}

impl SampleListener for SensorListener {
    fn on_sample(&self, sample: &RawSample) {
        if let Some(sensor) = self.sensor.upgrade() {
            sensor.handle_sample(self.generation, sample);
        }
    }
}
