//! In-process sensor platform backed by synthetic signals.
//!
//! Subscriptions are served by a single delivery task, mirroring how a
//! real platform delivers events on its own thread. The platform lock is
//! never held while listeners run, so listeners may re-subscribe from
//! inside their callback.

use super::sensors::{SimulatedSensor, default_catalog, synthesize};
use crate::config::SimulationConfig;
use crate::error::{MonitorError, Result};
use crate::platform::{
    DeliveryMode, RawSample, SampleListener, SensorPlatform, SubscriptionId,
};
use crate::sensors::{SensorDescriptor, SensorType};
use log::{debug, info, trace};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// Tick of the delivery task; also the fastest rate any sensor can reach.
const DELIVERY_TICK: Duration = Duration::from_millis(5);

/// Period used for on-change sensors, which report no minimum delay.
const ON_CHANGE_PERIOD: Duration = Duration::from_millis(200);

struct SimSubscription {
    id: SubscriptionId,
    descriptor: SensorDescriptor,
    mode: DeliveryMode,
    period: Duration,
    next_due: Instant,
    listener: Arc<dyn SampleListener>,
}

struct SimState {
    next_id: u64,
    subscriptions: Vec<SimSubscription>,
    rng: StdRng,
}

/// Simulated platform sensor service.
pub struct SimulatedPlatform {
    catalog: Vec<SimulatedSensor>,
    config: SimulationConfig,
    started: Instant,
    state: Mutex<SimState>,
}

impl SimulatedPlatform {
    pub fn new(config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            catalog: default_catalog(config.include_duplicates),
            config,
            started: Instant::now(),
            state: Mutex::new(SimState {
                next_id: 0,
                subscriptions: Vec::new(),
                rng,
            }),
        }
    }

    pub fn active_subscriptions(&self) -> usize {
        self.state.lock().subscriptions.len()
    }

    fn continuous_period(&self, descriptor: &SensorDescriptor, mode: DeliveryMode) -> Duration {
        let DeliveryMode::Continuous(rate) = mode else {
            return Duration::ZERO;
        };
        if descriptor.min_delay_us <= 0 {
            return ON_CHANGE_PERIOD;
        }
        let min_delay = Duration::from_micros(descriptor.min_delay_us as u64);
        rate.nominal_period(min_delay).max(DELIVERY_TICK)
    }

    fn trigger_delay(&self, rng: &mut StdRng) -> Duration {
        let min = self.config.trigger_min_secs;
        let max = self.config.trigger_max_secs.max(min);
        Duration::from_millis(rng.gen_range(min * 1000..=max * 1000))
    }

    /// Deliver every sample that is due at `now`. Returns how many were delivered.
    pub fn deliver_due(&self, now: Instant) -> usize {
        let t = now.saturating_duration_since(self.started);
        let mut batch: Vec<(Arc<dyn SampleListener>, RawSample)> = Vec::new();
        {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let mut fired = Vec::new();
            for sub in state.subscriptions.iter_mut() {
                if sub.next_due > now {
                    continue;
                }
                let kind = sub.descriptor.sensor_type.kind();
                let sample = RawSample {
                    sensor_type: sub.descriptor.sensor_type,
                    timestamp_ns: t.as_nanos() as i64,
                    values: synthesize(kind, t.as_secs_f32(), &mut state.rng),
                };
                batch.push((sub.listener.clone(), sample));
                match sub.mode {
                    DeliveryMode::Continuous(_) => sub.next_due = now + sub.period,
                    DeliveryMode::OneShot => fired.push(sub.id),
                }
            }
            state.subscriptions.retain(|s| !fired.contains(&s.id));
        }

        for (listener, sample) in &batch {
            trace!("Delivering sample for sensor type {}", sample.sensor_type);
            listener.on_sample(sample);
        }
        batch.len()
    }
}

impl SensorPlatform for SimulatedPlatform {
    fn sensor_list(&self) -> Vec<SensorDescriptor> {
        self.catalog.iter().map(|s| s.descriptor.clone()).collect()
    }

    fn default_sensor(&self, sensor_type: SensorType) -> Option<SensorDescriptor> {
        self.catalog
            .iter()
            .find(|s| s.is_default && s.descriptor.sensor_type == sensor_type)
            .map(|s| s.descriptor.clone())
    }

    fn subscribe(
        &self,
        sensor: &SensorDescriptor,
        mode: DeliveryMode,
        listener: Arc<dyn SampleListener>,
    ) -> Result<SubscriptionId> {
        if !self.catalog.iter().any(|s| s.descriptor == *sensor) {
            return Err(MonitorError::SubscriptionRejected(sensor.sensor_type.code()));
        }

        let period = self.continuous_period(sensor, mode);
        let mut state = self.state.lock();
        let delay = match mode {
            DeliveryMode::OneShot => self.trigger_delay(&mut state.rng),
            DeliveryMode::Continuous(_) => Duration::ZERO,
        };
        state.next_id += 1;
        let id = SubscriptionId(state.next_id);
        state.subscriptions.push(SimSubscription {
            id,
            descriptor: sensor.clone(),
            mode,
            period,
            next_due: Instant::now() + delay,
            listener,
        });
        debug!(
            "[Sim] Subscription {} for '{}' ({:?}, period {:?})",
            id, sensor.name, mode, period
        );
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut state = self.state.lock();
        let before = state.subscriptions.len();
        state.subscriptions.retain(|s| s.id != id);
        if state.subscriptions.len() != before {
            debug!("[Sim] Subscription {} cancelled", id);
        }
    }
}

/// Spawn the task that delivers due samples until `cancel` fires.
///
/// # Returns
///
/// A `JoinHandle` that completes once the task observed cancellation.
pub fn run_sensor_simulation(
    platform: Arc<SimulatedPlatform>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("[Sim] Sensor delivery started");
        let mut ticker = interval(DELIVERY_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    platform.deliver_due(Instant::now());
                }
            }
        }
        info!("[Sim] Sensor delivery stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::DeliveryRate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingListener {
        samples: AtomicUsize,
    }

    impl SampleListener for CountingListener {
        fn on_sample(&self, _sample: &RawSample) {
            self.samples.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn platform() -> SimulatedPlatform {
        SimulatedPlatform::new(SimulationConfig {
            trigger_min_secs: 1,
            trigger_max_secs: 2,
            include_duplicates: true,
            seed: Some(42),
        })
    }

    fn descriptor(platform: &SimulatedPlatform, code: i32) -> SensorDescriptor {
        platform.default_sensor(SensorType(code)).unwrap()
    }

    #[test]
    fn test_default_sensor_skips_secondary_instances() {
        let platform = platform();
        let accel = descriptor(&platform, 1);
        assert_eq!(accel.name, "LSM6DS3 Accelerometer");
        assert_eq!(platform.sensor_list()[0].name, "LSM6DS3 Accelerometer (wake-up)");
    }

    #[test]
    fn test_continuous_subscription_streams() {
        let platform = platform();
        let listener = Arc::new(CountingListener::default());
        let accel = descriptor(&platform, 1);
        let id = platform
            .subscribe(
                &accel,
                DeliveryMode::Continuous(DeliveryRate::Fastest),
                listener.clone(),
            )
            .unwrap();

        let now = Instant::now();
        assert_eq!(platform.deliver_due(now), 1);
        // Not due again within the period.
        assert_eq!(platform.deliver_due(now), 0);
        assert_eq!(platform.deliver_due(now + Duration::from_millis(10)), 1);
        assert_eq!(listener.samples.load(Ordering::SeqCst), 2);

        platform.unsubscribe(id);
        assert_eq!(platform.deliver_due(now + Duration::from_secs(1)), 0);
    }

    #[test]
    fn test_one_shot_delivers_once() {
        let platform = platform();
        let listener = Arc::new(CountingListener::default());
        let motion = descriptor(&platform, 17);
        platform
            .subscribe(&motion, DeliveryMode::OneShot, listener.clone())
            .unwrap();

        let now = Instant::now();
        assert_eq!(platform.deliver_due(now), 0);
        assert_eq!(platform.deliver_due(now + Duration::from_secs(3)), 1);
        assert_eq!(platform.active_subscriptions(), 0);
        assert_eq!(platform.deliver_due(now + Duration::from_secs(10)), 0);
        assert_eq!(listener.samples.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_descriptor_is_rejected() {
        let platform = platform();
        let listener = Arc::new(CountingListener::default());
        let bogus = SensorDescriptor::new(SensorType(99), "bogus");
        assert!(
            platform
                .subscribe(&bogus, DeliveryMode::OneShot, listener)
                .is_err()
        );
    }

    #[test]
    fn test_delivery_task_stops_on_cancel() {
        let platform = Arc::new(platform());
        let listener = Arc::new(CountingListener::default());
        let accel = descriptor(&platform, 1);
        platform
            .subscribe(
                &accel,
                DeliveryMode::Continuous(DeliveryRate::Fastest),
                listener.clone(),
            )
            .unwrap();

        tokio_test::block_on(async {
            let cancel = CancellationToken::new();
            let handle = run_sensor_simulation(platform.clone(), cancel.clone());
            tokio::time::sleep(Duration::from_millis(60)).await;
            cancel.cancel();
            handle.await.unwrap();
        });

        assert!(listener.samples.load(Ordering::SeqCst) > 0);
    }
}
