//! Sensor monitor library.
//!
//! Enumerates the sensors a platform offers, keeps one monitored entry per
//! sensor type, throttles their samples to a target rate and fans change
//! notifications out to UI observers.

pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod platform;
pub mod sensors;
pub mod ui;

#[cfg(test)]
mod testing;
