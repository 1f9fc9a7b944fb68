//! Platform sensor descriptors and the per-kind display profiles.
//!
//! A [`SensorDescriptor`] is what the platform reports for one physical
//! sensor. The [`SensorKind`] derived from its type code decides how the
//! sensor is labelled and how its values are rendered.

use super::format::ValueFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Numeric platform sensor type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorType(pub i32);

impl SensorType {
    pub fn code(self) -> i32 {
        self.0
    }

    pub fn kind(self) -> SensorKind {
        SensorKind::from_type(self)
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable description of a physical sensor as reported by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDescriptor {
    pub sensor_type: SensorType,
    pub name: String,
    pub vendor: String,
    pub version: i32,
    /// Power draw in mA.
    pub power: f32,
    pub resolution: f32,
    /// Minimum delay between two events in microseconds, 0 for one-shot sensors.
    pub min_delay_us: i32,
    pub max_range: f32,
}

impl SensorDescriptor {
    /// Create a descriptor with placeholder hardware characteristics.
    pub fn new(sensor_type: SensorType, name: impl Into<String>) -> Self {
        Self {
            sensor_type,
            name: name.into(),
            vendor: String::new(),
            version: 1,
            power: 0.0,
            resolution: 0.0,
            min_delay_us: 0,
            max_range: 0.0,
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    pub fn with_characteristics(
        mut self,
        power: f32,
        resolution: f32,
        min_delay_us: i32,
        max_range: f32,
    ) -> Self {
        self.power = power;
        self.resolution = resolution;
        self.min_delay_us = min_delay_us;
        self.max_range = max_range;
        self
    }

    /// Render the expandable info panel text.
    pub fn info(&self) -> String {
        format!(
            "Name:         {}\n\
             Type:         {}\n\
             Vendor:       {}\n\
             Version:      {}\n\
             Power:        {} mA\n\
             Resolution:   {}\n\
             MinDelay:     {}\n\
             MaximumRange: {}\n",
            self.name,
            self.sensor_type,
            self.vendor,
            self.version,
            self.power,
            self.resolution,
            self.min_delay_us,
            self.max_range
        )
    }
}

/// Known sensor kinds, keyed by platform type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum SensorKind {
    Accelerometer,
    MagneticField,
    Orientation,
    Gyroscope,
    Light,
    Pressure,
    Temperature,
    Proximity,
    Gravity,
    LinearAcceleration,
    RotationVector,
    RelativeHumidity,
    AmbientTemperature,
    MagneticFieldUncalibrated,
    GameRotationVector,
    GyroscopeUncalibrated,
    SignificantMotion,
    StepDetector,
    StepCounter,
    GeomagneticRotationVector,
    Unknown,
}

/// How a sensor kind is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorProfile {
    pub ui_name: &'static str,
    pub friendly_name: &'static str,
    pub format: ValueFormat,
}

impl SensorKind {
    /// Map a platform type code to a kind. Unrecognised codes map to [`SensorKind::Unknown`].
    pub fn from_type(sensor_type: SensorType) -> Self {
        SensorKind::iter()
            .find(|kind| kind.type_code() == Some(sensor_type))
            .unwrap_or(SensorKind::Unknown)
    }

    /// Platform type code of this kind, `None` for [`SensorKind::Unknown`].
    pub fn type_code(self) -> Option<SensorType> {
        let code = match self {
            SensorKind::Accelerometer => 1,
            SensorKind::MagneticField => 2,
            SensorKind::Orientation => 3,
            SensorKind::Gyroscope => 4,
            SensorKind::Light => 5,
            SensorKind::Pressure => 6,
            SensorKind::Temperature => 7,
            SensorKind::Proximity => 8,
            SensorKind::Gravity => 9,
            SensorKind::LinearAcceleration => 10,
            SensorKind::RotationVector => 11,
            SensorKind::RelativeHumidity => 12,
            SensorKind::AmbientTemperature => 13,
            SensorKind::MagneticFieldUncalibrated => 14,
            SensorKind::GameRotationVector => 15,
            SensorKind::GyroscopeUncalibrated => 16,
            SensorKind::SignificantMotion => 17,
            SensorKind::StepDetector => 18,
            SensorKind::StepCounter => 19,
            SensorKind::GeomagneticRotationVector => 20,
            SensorKind::Unknown => return None,
        };
        Some(SensorType(code))
    }

    /// One-shot sensors deliver a single event per subscription.
    pub fn is_one_shot(self) -> bool {
        matches!(self, SensorKind::SignificantMotion)
    }

    pub fn profile(self) -> SensorProfile {
        let (ui_name, friendly_name, format) = match self {
            SensorKind::Accelerometer => {
                ("Accelerometer (m/s2)", "acceleration", ValueFormat::Vector3)
            }
            SensorKind::MagneticField => {
                ("Magnetic field (μT)", "magnetic-field", ValueFormat::Vector3)
            }
            SensorKind::Orientation => ("Orientation", "orientation", ValueFormat::Orientation),
            SensorKind::Gyroscope => ("Gyroscope (rad/s)", "gyroscope", ValueFormat::Vector3),
            SensorKind::Light => ("Light (lux)", "light", ValueFormat::Scalar),
            SensorKind::Pressure => ("Pressure (hPa)", "pressure", ValueFormat::Scalar),
            SensorKind::Temperature => ("Temperature (°C)", "temperature", ValueFormat::Scalar),
            SensorKind::Proximity => ("Proximity (cm)", "proximity", ValueFormat::Scalar),
            SensorKind::Gravity => ("Gravity (m/s2)", "gravity", ValueFormat::Vector3),
            SensorKind::LinearAcceleration => (
                "Linear acceleration (m/s2)",
                "linear-acceleration",
                ValueFormat::Vector3,
            ),
            SensorKind::RotationVector => ("Rotation", "rotation", ValueFormat::Vector3),
            SensorKind::RelativeHumidity => {
                ("Relative Humidity (%)", "relhumidity", ValueFormat::Scalar)
            }
            SensorKind::AmbientTemperature => (
                "Ambient Temperature (°C)",
                "ambtemperature",
                ValueFormat::Scalar,
            ),
            SensorKind::MagneticFieldUncalibrated => (
                "Magnetic field Uncalibrated (μT)",
                "magnetic-field-uncalibrated",
                ValueFormat::Vector3,
            ),
            SensorKind::GameRotationVector => {
                ("Game Rotation", "game-rotation", ValueFormat::Vector3)
            }
            SensorKind::GyroscopeUncalibrated => (
                "Gyroscope Uncalibrated (rad/s)",
                "gyroscope-uncalibrated",
                ValueFormat::Vector3,
            ),
            SensorKind::SignificantMotion => (
                "Significant Motion Trigger",
                "significant-motion",
                ValueFormat::Trigger,
            ),
            SensorKind::StepDetector => ("Foot Step Detector", "step-detector", ValueFormat::Scalar),
            SensorKind::StepCounter => ("Foot Step Counter", "step-counter", ValueFormat::Scalar),
            SensorKind::GeomagneticRotationVector => (
                "Geomagnetic Rotation",
                "Geomagnetic-rotation",
                ValueFormat::Vector3,
            ),
            SensorKind::Unknown => ("<Unknown>", "unknown", ValueFormat::Scalar),
        };
        SensorProfile {
            ui_name,
            friendly_name,
            format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes_round_trip_through_kind() {
        for kind in SensorKind::iter() {
            if let Some(code) = kind.type_code() {
                assert_eq!(SensorKind::from_type(code), kind);
            }
        }
    }

    #[test]
    fn test_unknown_type_gets_generic_profile() {
        let kind = SensorType(65_537).kind();
        assert_eq!(kind, SensorKind::Unknown);

        let profile = kind.profile();
        assert_eq!(profile.ui_name, "<Unknown>");
        assert_eq!(profile.friendly_name, "unknown");
        assert_eq!(profile.format, ValueFormat::Scalar);
    }

    #[test]
    fn test_friendly_names_are_unique() {
        let mut names: Vec<_> = SensorKind::iter()
            .map(|kind| kind.profile().friendly_name)
            .collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(names.len(), before);
    }

    #[test]
    fn test_only_significant_motion_is_one_shot() {
        let one_shot: Vec<_> = SensorKind::iter().filter(|k| k.is_one_shot()).collect();
        assert_eq!(one_shot, vec![SensorKind::SignificantMotion]);
        assert_eq!(
            SensorKind::SignificantMotion.profile().format,
            ValueFormat::Trigger
        );
    }

    #[test]
    fn test_info_lists_descriptor_fields() {
        let descriptor = SensorDescriptor::new(SensorType(5), "BH1750 Light")
            .with_vendor("Rohm")
            .with_characteristics(0.12, 1.0, 20_000, 65_535.0);
        let info = descriptor.info();

        assert!(info.contains("Name:         BH1750 Light\n"));
        assert!(info.contains("Type:         5\n"));
        assert!(info.contains("Vendor:       Rohm\n"));
        assert!(info.contains("Power:        0.12 mA\n"));
        assert!(info.contains("MinDelay:     20000\n"));
        assert!(info.contains("MaximumRange: 65535\n"));
    }
}
