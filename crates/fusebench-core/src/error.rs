//! Common error taxonomy for bench components.
//!
//! Every instrument implementation, simulated or real, reports failures as a
//! [`BenchError`]. The sequencer decides per variant whether an error turns
//! into a failed test result or stops the whole run:
//!
//! ```rust
//! use fusebench_core::BenchError;
//!
//! fn stops_sequence(err: &BenchError) -> bool {
//!     match err {
//!         BenchError::Cancelled => true,
//!         BenchError::Range { .. }
//!         | BenchError::InvalidArgument { .. }
//!         | BenchError::InstrumentFault { .. } => false,
//!     }
//! }
//!
//! let err = BenchError::range("voltage", 121.0, 0.0, 120.0);
//! assert!(!stops_sequence(&err));
//! assert!(err.is_range());
//! ```

/// Errors raised by instruments and observed by the sequencer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BenchError {
    /// A setpoint was outside the instrument's declared limits.
    #[error("{quantity} setpoint {value} outside allowed range [{min}, {max}]")]
    Range {
        /// What was being programmed (e.g. "voltage", "current limit").
        quantity: &'static str,
        /// The rejected value.
        value: f64,
        /// Lowest accepted value, inclusive.
        min: f64,
        /// Highest accepted value, inclusive.
        max: f64,
    },

    /// An argument is not one the instrument supports (e.g. a metering range).
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument.
        message: String,
    },

    /// The instrument failed to carry out an operation.
    #[error("instrument fault on {instrument}: {message}")]
    InstrumentFault {
        /// Name of the failing instrument.
        instrument: String,
        /// Description of the failure.
        message: String,
    },

    /// Cooperative cancellation was observed.
    #[error("operation cancelled")]
    Cancelled,
}

impl BenchError {
    /// Creates a [`BenchError::Range`].
    pub fn range(quantity: &'static str, value: f64, min: f64, max: f64) -> Self {
        BenchError::Range {
            quantity,
            value,
            min,
            max,
        }
    }

    /// Creates a [`BenchError::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        BenchError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a [`BenchError::InstrumentFault`].
    pub fn fault(instrument: impl Into<String>, message: impl Into<String>) -> Self {
        BenchError::InstrumentFault {
            instrument: instrument.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a range error.
    pub fn is_range(&self) -> bool {
        matches!(self, BenchError::Range { .. })
    }

    /// Returns `true` if this is an invalid argument error.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, BenchError::InvalidArgument { .. })
    }

    /// Returns `true` if this is an instrument fault.
    pub fn is_fault(&self) -> bool {
        matches!(self, BenchError::InstrumentFault { .. })
    }

    /// Returns `true` if this error signals cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BenchError::Cancelled)
    }
}
