//! Rendering of cached sensor readings into display strings.

use chrono::{DateTime, Local};

/// Latest reading kept for display.
///
/// Continuous sensors only use `values`. One-shot sensors additionally
/// record when they fired, both as wall time and platform timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reading {
    pub values: [f32; 3],
    pub wall_ms: i64,
    pub timestamp_ns: i64,
}

impl Reading {
    /// Copy up to three components, leaving the remaining ones untouched.
    pub fn copy_components(&mut self, components: &[f32]) {
        for (slot, value) in self.values.iter_mut().zip(components) {
            *slot = *value;
        }
    }
}

/// Value layout chosen per sensor kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// Three signed components with two decimals.
    Vector3,
    /// First component, no decimals.
    Scalar,
    /// Three signed degrees, zero padded to width 3.
    Orientation,
    /// First component plus the wall time and timestamp of the firing.
    Trigger,
}

impl ValueFormat {
    pub fn render(self, reading: &Reading) -> String {
        let [x, y, z] = reading.values;
        match self {
            ValueFormat::Vector3 => format!("{:+.2} {:+.2} {:+.2}", x, y, z),
            ValueFormat::Scalar => format!("{:.0}", x),
            ValueFormat::Orientation => format!("{:+03.0} {:+03.0} {:+03.0}", x, y, z),
            ValueFormat::Trigger => format!(
                "{:.0} at {} (nanosec:  {})",
                x,
                wall_time(reading.wall_ms),
                reading.timestamp_ns
            ),
        }
    }
}

fn wall_time(ms: i64) -> String {
    match DateTime::from_timestamp_millis(ms) {
        Some(utc) => utc.with_timezone(&Local).format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}
