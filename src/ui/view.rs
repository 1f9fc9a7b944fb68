//! Terminal rendering of the sensor table.
//!
//! The view owns the UI-side copy of each row. It is only touched from
//! the UI task, which applies [`UiEvent`]s received from the channel
//! observer.

use crate::config::{parse_sample_rate, update_interval_for};
use crate::sensors::{MonitoredSensor, SensorEventKind, SensorRegistry, SensorType, UiEvent};
use std::fmt::Write as _;
use std::time::Duration;

/// Observed update frequency for display: `ceil(1000 / avg_ms)`, or `--` without data.
pub fn format_observed_hz(average: Option<Duration>) -> String {
    match average {
        Some(avg) if !avg.is_zero() => {
            let avg_ms = avg.as_micros() as f64 / 1000.0;
            let hz = (1000.0 / avg_ms).ceil();
            format!("{}", hz as u64)
        }
        _ => "--".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Row {
    sensor_type: SensorType,
    label: &'static str,
    /// Checkbox enabled: the platform allows the sensor.
    enabled: bool,
    checked: bool,
    value: String,
}

impl Row {
    fn from_sensor(sensor: &MonitoredSensor) -> Self {
        Self {
            sensor_type: sensor.sensor_type(),
            label: sensor.ui_name(),
            enabled: sensor.is_enabled_by_app(),
            checked: sensor.is_enabled_by_user(),
            value: sensor.value(),
        }
    }

    fn render(&self) -> String {
        let check = match (self.enabled, self.checked) {
            (true, true) => "[x]",
            (true, false) => "[ ]",
            (false, true) => "(x)",
            (false, false) => "( )",
        };
        format!("{} {:<34} {}", check, self.label, self.value)
    }
}

/// UI-side state: one row per monitored sensor plus the rate fields.
pub struct SensorView {
    rows: Vec<Row>,
    target_hz: u32,
    last_actual: Option<Duration>,
}

impl SensorView {
    pub fn new(registry: &SensorRegistry, target_hz: u32) -> Self {
        Self {
            rows: registry
                .sensors()
                .iter()
                .map(|s| Row::from_sensor(s))
                .collect(),
            target_hz,
            last_actual: None,
        }
    }

    pub fn target_hz(&self) -> u32 {
        self.target_hz
    }

    /// Refresh the row an event refers to. Returns the re-rendered row.
    pub fn apply(&mut self, event: UiEvent, registry: &SensorRegistry) -> Option<String> {
        let sensor = registry.find_by_type(event.sensor_type)?;
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.sensor_type == event.sensor_type)?;
        match event.kind {
            SensorEventKind::StateChanged => {
                row.enabled = sensor.is_enabled_by_app();
                row.checked = sensor.is_enabled_by_user();
                row.value = sensor.value();
            }
            SensorEventKind::ValueChanged => {
                row.value = sensor.value();
            }
        }
        Some(row.render())
    }

    /// Handle an event from the channel observer and return the lines to print.
    ///
    /// A value change also re-reads the observed rate, so the rate field
    /// follows the data without waiting for the periodic refresh.
    pub fn handle_event(&mut self, event: UiEvent, registry: &SensorRegistry) -> Vec<String> {
        let mut lines: Vec<String> = self.apply(event, registry).into_iter().collect();
        if event.kind == SensorEventKind::ValueChanged
            && let Some(hz) = self.refresh_observed_hz(registry.actual_update_interval())
        {
            lines.push(format!("Actual: {} Hz", hz));
        }
        lines
    }

    /// Re-read a sensor's checkbox after a user toggle.
    pub fn sync_row(&mut self, sensor: &MonitoredSensor) -> Option<String> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.sensor_type == sensor.sensor_type())?;
        *row = Row::from_sensor(sensor);
        Some(row.render())
    }

    /// Update the observed rate field. Returns the new text only when it changed.
    pub fn refresh_observed_hz(&mut self, average: Option<Duration>) -> Option<String> {
        if average == self.last_actual {
            return None;
        }
        self.last_actual = average;
        Some(format_observed_hz(average))
    }

    /// Apply user-entered rate text.
    ///
    /// Unparseable text leaves the previous rate; returns the new rate
    /// when it changed.
    pub fn set_sample_rate(&mut self, text: &str, registry: &SensorRegistry) -> Option<u32> {
        let hz = parse_sample_rate(text)?;
        if hz == self.target_hz {
            return None;
        }
        self.target_hz = hz;
        registry.set_update_target(update_interval_for(hz));
        Some(hz)
    }

    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Target: {} Hz   Actual: {} Hz",
            self.target_hz,
            format_observed_hz(self.last_actual)
        );
        for row in &self.rows {
            let _ = writeln!(out, "{}", row.render());
        }
        out
    }
}
