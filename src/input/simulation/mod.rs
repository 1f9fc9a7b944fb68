//! Simulated sensor platform for running without hardware.

mod platform;
pub mod sensors;

pub use platform::{SimulatedPlatform, run_sensor_simulation};
