//! Test sequence orchestration for the three-fuse network.
//!
//! A [`SequenceOrchestrator`] owns three [`VoltageSource`]s (one per fuse)
//! and a [`VoltMeter`]. For each of the eight fuse combinations it:
//!
//! 1. programs the current limit (if configured) and the drive voltage of
//!    every source, 24 V for an active fuse and 0 V otherwise
//! 2. enables every source
//! 3. waits for the stabilization delay
//! 4. reads the meter on the range picked by [`select_range`]
//! 5. judges the reading against the case window
//! 6. disables and zeroes every source, whatever happened before
//!
//! Progress is published through [`SequenceEvent`]s: status lines, one
//! [`TestResult`] per case, lifecycle transitions, and suppressed power-down
//! faults.
//!
//! # Error Handling
//!
//! An instrument error inside a case does not stop the run; it becomes a
//! failed result whose message starts with `Error:`. Cancellation ends the
//! run with [`RunOutcome::Cancelled`], and a crashed instrument task with
//! [`RunOutcome::Failed`]. The only error `start` itself returns is
//! [`SequenceError::AlreadyRunning`].
//!
//! # Examples
//!
//! ```rust
//! use fusebench_instrument::sim::{SimulatedVoltMeter, SimulatedVoltageSource};
//! use fusebench_sequencer::{RunOutcome, SequenceOrchestrator, SequencerConfig};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let sources = ["V1", "V2", "V3"].map(|name| {
//!     Arc::new(SimulatedVoltageSource::builder().name(name).build())
//! });
//! let meter = Arc::new(SimulatedVoltMeter::builder().name("DMM").build());
//!
//! let config = SequencerConfig::builder()
//!     .name("fuse-board")
//!     .on_status(|text| println!("{text}"))
//!     .on_result(|result| println!("{}: {}", result.name(), result.message()))
//!     .build();
//!
//! let orchestrator = SequenceOrchestrator::new(sources, meter, config);
//! assert_eq!(orchestrator.start().await.unwrap(), RunOutcome::Completed);
//! # }
//! ```
//!
//! ## Feature Flags
//! - `tracing`: structured logs for transitions, readings, and power-down faults
//! - `metrics`: counters for runs, cases, and power-down faults; a case duration histogram
//! - `serde`: `Serialize` for [`TestResult`] and [`SequenceState`]
//!
//! [`VoltageSource`]: fusebench_instrument::VoltageSource
//! [`VoltMeter`]: fusebench_instrument::VoltMeter

mod config;
mod dispatch;
mod error;
mod events;
mod orchestrator;
mod power;
mod protocol;
mod result;
mod state;

pub use config::{SequencerConfig, SequencerConfigBuilder};
pub use error::SequenceError;
pub use events::SequenceEvent;
pub use orchestrator::{RunOutcome, SequenceOrchestrator};
pub use protocol::select_range;
pub use result::TestResult;
pub use state::SequenceState;
