//! Automated test bench for a three-fuse resistor network.
//!
//! `fusebench` drives three programmable voltage sources (one per fuse path)
//! through all eight on/off combinations, reads the network output with a
//! DC voltmeter, and judges every reading against a predicted value and a
//! tolerance window. Each piece is available as an individual crate and is
//! re-exported here.
//!
//! # Crates
//!
//! - [`core`]: events, cooperative cancellation, and the shared error type
//! - [`circuit`]: fuse states, the circuit model, tolerances, and test cases
//! - [`instrument`]: voltage source and voltmeter contracts, plus simulated
//!   instruments (`sim` feature)
//! - [`sequencer`]: the orchestrator that runs the cases and powers the bench
//!   down safely
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! fusebench = { version = "0.1", features = ["tracing"] }
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "sim")]
//! # {
//! use fusebench::instrument::sim::{SimulatedVoltMeter, SimulatedVoltageSource};
//! use fusebench::sequencer::{SequenceOrchestrator, SequencerConfig};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let sources = ["V1", "V2", "V3"].map(|name| {
//!     Arc::new(SimulatedVoltageSource::builder().name(name).build())
//! });
//! let meter = Arc::new(SimulatedVoltMeter::builder().name("DMM").build());
//!
//! let config = SequencerConfig::builder()
//!     .on_result(|result| println!("{}: {}", result.name(), result.message()))
//!     .build();
//!
//! let outcome = SequenceOrchestrator::new(sources, meter, config)
//!     .start()
//!     .await;
//! println!("{outcome:?}");
//! # }
//! # }
//! ```

pub use fusebench_circuit as circuit;
pub use fusebench_core as core;
pub use fusebench_instrument as instrument;
pub use fusebench_sequencer as sequencer;
