//! Input sources feeding the sensor monitor.
//!
//! Current input sources:
//! - `simulation`: synthetic sensors served by an in-process platform

pub mod simulation;

pub use simulation::SimulatedPlatform;
