//! Sensor catalog and signal generation for the simulated platform.
//!
//! Provides a plausible set of device sensors and synthetic readings for
//! development and testing without real hardware.

use crate::sensors::{SensorDescriptor, SensorKind, SensorType};
use rand::Rng;
use std::f32::consts::TAU;

/// One sensor exposed by the simulated platform.
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    pub descriptor: SensorDescriptor,
    /// Whether this is the platform default for its type.
    pub is_default: bool,
}

impl SimulatedSensor {
    fn new(kind: SensorKind, name: &str, vendor: &str) -> Self {
        let sensor_type = kind.type_code().unwrap_or(SensorType(0));
        let (power, resolution, min_delay_us, max_range) = characteristics(kind);
        Self {
            descriptor: SensorDescriptor::new(sensor_type, name)
                .with_vendor(vendor)
                .with_characteristics(power, resolution, min_delay_us, max_range),
            is_default: true,
        }
    }

    fn secondary(mut self) -> Self {
        self.is_default = false;
        self
    }
}

fn characteristics(kind: SensorKind) -> (f32, f32, i32, f32) {
    match kind {
        SensorKind::Accelerometer | SensorKind::LinearAcceleration | SensorKind::Gravity => {
            (0.25, 0.0024, 5_000, 39.2)
        }
        SensorKind::Gyroscope | SensorKind::GyroscopeUncalibrated => (6.1, 0.0011, 5_000, 34.9),
        SensorKind::MagneticField | SensorKind::MagneticFieldUncalibrated => {
            (0.6, 0.06, 20_000, 4912.0)
        }
        SensorKind::Orientation
        | SensorKind::RotationVector
        | SensorKind::GameRotationVector
        | SensorKind::GeomagneticRotationVector => (6.8, 0.000_06, 5_000, 1.0),
        SensorKind::Light => (0.18, 1.0, 200_000, 65_535.0),
        SensorKind::Pressure => (0.004, 0.01, 40_000, 1100.0),
        SensorKind::Proximity => (0.2, 5.0, 0, 5.0),
        SensorKind::Temperature | SensorKind::AmbientTemperature => (0.1, 0.1, 1_000_000, 85.0),
        SensorKind::RelativeHumidity => (0.1, 0.1, 1_000_000, 100.0),
        SensorKind::StepDetector | SensorKind::StepCounter => (0.3, 1.0, 0, 1.0),
        SensorKind::SignificantMotion => (0.3, 1.0, -1, 1.0),
        SensorKind::Unknown => (0.0, 0.0, 100_000, 0.0),
    }
}

/// The sensors a typical phone exposes.
///
/// With `include_duplicates`, a secondary accelerometer and light sensor
/// are listed before the default ones, as some vendors do.
pub fn default_catalog(include_duplicates: bool) -> Vec<SimulatedSensor> {
    let mut catalog = Vec::new();
    if include_duplicates {
        catalog.push(
            SimulatedSensor::new(SensorKind::Accelerometer, "LSM6DS3 Accelerometer (wake-up)", "STMicro")
                .secondary(),
        );
    }
    catalog.extend([
        SimulatedSensor::new(SensorKind::Accelerometer, "LSM6DS3 Accelerometer", "STMicro"),
        SimulatedSensor::new(SensorKind::MagneticField, "AK09918 Magnetometer", "AKM"),
        SimulatedSensor::new(SensorKind::Orientation, "Orientation", "Simulated"),
        SimulatedSensor::new(SensorKind::Gyroscope, "LSM6DS3 Gyroscope", "STMicro"),
    ]);
    if include_duplicates {
        catalog.push(
            SimulatedSensor::new(SensorKind::Light, "TMD4903 Ambient Light (rear)", "AMS")
                .secondary(),
        );
    }
    catalog.extend([
        SimulatedSensor::new(SensorKind::Light, "TMD4903 Ambient Light", "AMS"),
        SimulatedSensor::new(SensorKind::Pressure, "BMP280 Barometer", "Bosch"),
        SimulatedSensor::new(SensorKind::Proximity, "TMD4903 Proximity", "AMS"),
        SimulatedSensor::new(SensorKind::Gravity, "Gravity", "Simulated"),
        SimulatedSensor::new(SensorKind::LinearAcceleration, "Linear Acceleration", "Simulated"),
        SimulatedSensor::new(SensorKind::RotationVector, "Rotation Vector", "Simulated"),
        SimulatedSensor::new(SensorKind::RelativeHumidity, "SHT40 Humidity", "Sensirion"),
        SimulatedSensor::new(SensorKind::AmbientTemperature, "SHT40 Temperature", "Sensirion"),
        SimulatedSensor::new(SensorKind::SignificantMotion, "Significant Motion Detector", "Simulated"),
        SimulatedSensor::new(SensorKind::StepCounter, "Step Counter", "Simulated"),
    ]);
    catalog
}

/// Synthetic reading for `kind` at `t` seconds since platform start.
pub fn synthesize<R: Rng>(kind: SensorKind, t: f32, rng: &mut R) -> Vec<f32> {
    let mut noise = |scale: f32| rng.gen_range(-scale..=scale);
    match kind {
        SensorKind::Accelerometer => vec![
            0.3 * (TAU * 0.2 * t).sin() + noise(0.05),
            0.3 * (TAU * 0.2 * t).cos() + noise(0.05),
            9.81 + noise(0.05),
        ],
        SensorKind::Gravity => vec![0.0, 0.0, 9.81],
        SensorKind::LinearAcceleration => vec![noise(0.1), noise(0.1), noise(0.1)],
        SensorKind::Gyroscope | SensorKind::GyroscopeUncalibrated => {
            vec![noise(0.02), noise(0.02), 0.1 * (TAU * 0.1 * t).sin()]
        }
        SensorKind::MagneticField | SensorKind::MagneticFieldUncalibrated => {
            vec![22.0 + noise(0.5), -5.0 + noise(0.5), -40.0 + noise(0.5)]
        }
        SensorKind::Orientation => vec![(t * 10.0) % 360.0, noise(3.0), noise(3.0)],
        SensorKind::RotationVector
        | SensorKind::GameRotationVector
        | SensorKind::GeomagneticRotationVector => {
            let half = TAU * 0.02 * t / 2.0;
            vec![0.0, 0.0, half.sin()]
        }
        SensorKind::Light => vec![300.0 + 100.0 * (TAU * 0.05 * t).sin() + noise(5.0)],
        SensorKind::Pressure => vec![1013.25 + noise(0.2)],
        SensorKind::Proximity => vec![if (t / 7.0) as u32 % 2 == 0 { 5.0 } else { 0.0 }],
        SensorKind::Temperature | SensorKind::AmbientTemperature => vec![21.5 + noise(0.3)],
        SensorKind::RelativeHumidity => vec![45.0 + noise(1.0)],
        SensorKind::StepCounter => vec![(t * 1.5).floor()],
        SensorKind::StepDetector | SensorKind::SignificantMotion => vec![1.0],
        SensorKind::Unknown => vec![noise(1.0)],
    }
}
