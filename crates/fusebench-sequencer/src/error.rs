//! Error types for the sequencer.

use fusebench_core::BenchError;

/// Errors that end or prevent a sequence run.
///
/// Instrument errors inside a single case never show up here; they become a
/// failed [`TestResult`](crate::TestResult) instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SequenceError {
    /// `start` was called while a run was in progress.
    #[error("a test sequence is already running")]
    AlreadyRunning,

    /// Cancellation was requested.
    #[error("test sequence cancelled")]
    Cancelled,

    /// The worker task performing an instrument call died.
    #[error("{instrument} task for {operation} failed: {message}")]
    Dispatch {
        /// Instrument the call was addressed to.
        instrument: &'static str,
        /// The call that was running.
        operation: &'static str,
        /// Description of the failure (e.g. the panic message).
        message: String,
    },
}

impl SequenceError {
    /// Returns `true` if this is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SequenceError::Cancelled)
    }

    /// Returns `true` if this error was raised because a run was in progress.
    pub fn is_already_running(&self) -> bool {
        matches!(self, SequenceError::AlreadyRunning)
    }
}

/// How an error inside a case is handled.
#[derive(Debug)]
pub(crate) enum CaseError {
    /// Recorded as a failed result; the sequence continues.
    Instrument(BenchError),
    /// Leaves the case and stops the sequence.
    Abort(SequenceError),
}

impl CaseError {
    /// Flattens into a [`BenchError`] for fault reporting.
    pub(crate) fn into_bench_error(self, instrument: &str) -> BenchError {
        match self {
            CaseError::Instrument(err) => err,
            CaseError::Abort(SequenceError::Cancelled) => BenchError::Cancelled,
            CaseError::Abort(other) => BenchError::fault(instrument, other.to_string()),
        }
    }
}

impl From<BenchError> for CaseError {
    fn from(err: BenchError) -> Self {
        match err {
            BenchError::Cancelled => CaseError::Abort(SequenceError::Cancelled),
            other => CaseError::Instrument(other),
        }
    }
}

impl From<SequenceError> for CaseError {
    fn from(err: SequenceError) -> Self {
        CaseError::Abort(err)
    }
}
