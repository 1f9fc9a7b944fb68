//! Terminal shell over the sensor registry.
//!
//! Plays the part of the sensor table screen: rows with a checkbox and a
//! value, a target-rate field, and an observed-rate field refreshed on
//! value changes and once per second.

pub mod command;
pub mod view;

pub use command::{Command, HELP};
pub use view::{SensorView, format_observed_hz};

use crate::error::{MonitorError, Result};
use crate::sensors::{ALL_SENSORS, SensorRegistry};

/// Output of one command.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            quit: false,
        }
    }
}

/// Apply a command to the registry and the view.
pub fn execute(command: Command, registry: &SensorRegistry, view: &mut SensorView) -> Result<Reply> {
    match command {
        Command::Rate(text) => Ok(match view.set_sample_rate(&text, registry) {
            Some(hz) => Reply::line(format!("Target rate set to {} Hz", hz)),
            None => Reply::line(format!("Target rate stays at {} Hz", view.target_hz())),
        }),
        Command::Enable(name) => {
            let affected = registry.enable_sensor(&name);
            if affected == 0 {
                return Err(unknown_sensor(&name));
            }
            // Enabling alone does not subscribe.
            if name == ALL_SENSORS {
                registry.start_sensors();
            } else if let Some(sensor) = registry.find_by_friendly_name(&name) {
                sensor.start_listening();
            }
            Ok(Reply::default())
        }
        Command::Disable(name) => {
            if registry.disable_sensor(&name) == 0 {
                return Err(unknown_sensor(&name));
            }
            Ok(Reply::default())
        }
        Command::Toggle { name, checked } => {
            let sensor = registry
                .find_by_friendly_name(&name)
                .ok_or_else(|| unknown_sensor(&name))?;
            sensor.on_user_toggle(checked);
            Ok(view
                .sync_row(sensor)
                .map(Reply::line)
                .unwrap_or_default())
        }
        Command::Info(name) => {
            let sensor = registry
                .find_by_friendly_name(&name)
                .ok_or_else(|| unknown_sensor(&name))?;
            Ok(Reply {
                lines: sensor.info().lines().map(str::to_string).collect(),
                quit: false,
            })
        }
        Command::Pause => {
            registry.stop_sensors();
            Ok(Reply::line("Sensors paused"))
        }
        Command::Resume => {
            registry.enable_sensor(ALL_SENSORS);
            registry.start_sensors();
            Ok(Reply::line("Sensors resumed"))
        }
        Command::List => Ok(Reply {
            lines: view.render_table().lines().map(str::to_string).collect(),
            quit: false,
        }),
        Command::Help => Ok(Reply::line(HELP)),
        Command::Quit => Ok(Reply {
            lines: Vec::new(),
            quit: true,
        }),
    }
}

fn unknown_sensor(name: &str) -> MonitorError {
    MonitorError::InvalidCommand(format!("no sensor named '{}'", name))
}
