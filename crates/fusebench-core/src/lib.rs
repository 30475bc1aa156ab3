//! Core infrastructure for fusebench.
//!
//! This crate provides shared functionality used across all fusebench crates:
//! - Event system for progress and result reporting
//! - Cooperative cancellation
//! - The error taxonomy shared by instruments and the sequencer

pub mod cancel;
pub mod error;
pub mod events;

pub use cancel::CancellationSignal;
pub use error::BenchError;
pub use events::{BenchEvent, SharedListener, EventListener, EventListeners, FnListener};
