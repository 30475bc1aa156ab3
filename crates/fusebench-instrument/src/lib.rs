//! Instrument contracts for the fuse network bench.
//!
//! Two capability sets are defined, each with interchangeable
//! implementations (simulated now, real hardware later):
//! - [`VoltageSource`]: a programmable DC supply with declared limits
//! - [`VoltMeter`]: a DC voltmeter with enumerated ranges and NPLC integration
//!
//! Both traits expose `async` methods returning `Send` futures and take
//! `&self`, so a sequencer can hand a shared handle to a worker task for each
//! call.
//!
//! ## Strongly Typed Arguments
//!
//! Metering ranges and integration settings are enums. A range that the
//! meter does not support cannot be passed at all; raw values coming from a
//! configuration file go through [`MeterRange::try_from`], which reports
//! [`BenchError::InvalidArgument`](fusebench_core::BenchError::InvalidArgument):
//!
//! ```rust
//! use fusebench_instrument::MeterRange;
//!
//! assert_eq!(MeterRange::try_from(10.0).unwrap(), MeterRange::Volts10);
//! assert!(MeterRange::try_from(5.0).unwrap_err().is_invalid_argument());
//! ```
//!
//! ## Feature Flags
//! - `sim` (default): simulated instruments in [`sim`]
//! - `tracing`: trace-level logging inside the simulated instruments

mod meter;
mod source;

#[cfg(feature = "sim")]
pub mod sim;

pub use meter::{Integration, MeasurementContext, MeterRange, VoltMeter};
pub use source::{SourceLimits, VoltageSource};
