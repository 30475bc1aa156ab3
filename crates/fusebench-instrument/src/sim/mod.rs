//! Simulated instruments.
//!
//! Drop-in implementations of [`VoltageSource`](crate::VoltageSource) and
//! [`VoltMeter`](crate::VoltMeter) for development without hardware. Timing
//! and noise are modeled, not measured.

mod meter;
mod source;

pub use meter::{SimulatedVoltMeter, SimulatedVoltMeterBuilder};
pub use source::{SimulatedVoltageSource, SimulatedVoltageSourceBuilder};
