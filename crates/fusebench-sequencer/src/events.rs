//! Events emitted by the sequence orchestrator.

use crate::result::TestResult;
use crate::state::SequenceState;
use fusebench_core::{BenchError, BenchEvent};
use std::time::Instant;

/// Events emitted while a test sequence runs.
///
/// Listeners registered on [`SequencerConfig`](crate::SequencerConfig) are
/// called synchronously, in registration order, from the task that drives the
/// sequence.
#[derive(Debug, Clone)]
pub enum SequenceEvent {
    /// A human-readable progress line.
    StatusChanged {
        /// Name of the sequencer instance
        sequence_name: String,
        /// When the event occurred
        timestamp: Instant,
        /// Status text, e.g. `Running Test_03 (4/8)`
        text: String,
    },
    /// A test case finished.
    TestResultAvailable {
        /// Name of the sequencer instance
        sequence_name: String,
        /// When the event occurred
        timestamp: Instant,
        /// The case outcome
        result: TestResult,
    },
    /// The orchestrator moved between lifecycle states.
    StateTransition {
        /// Name of the sequencer instance
        sequence_name: String,
        /// When the event occurred
        timestamp: Instant,
        /// Previous state
        from: SequenceState,
        /// New state
        to: SequenceState,
    },
    /// Disabling or zeroing a source failed during power-down.
    PowerDownFault {
        /// Name of the sequencer instance
        sequence_name: String,
        /// When the event occurred
        timestamp: Instant,
        /// Position of the source (0 for F1)
        source_index: usize,
        /// The suppressed error
        error: BenchError,
    },
}

impl BenchEvent for SequenceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SequenceEvent::StatusChanged { .. } => "sequence.status_changed",
            SequenceEvent::TestResultAvailable { .. } => "sequence.test_result",
            SequenceEvent::StateTransition { .. } => "sequence.state_transition",
            SequenceEvent::PowerDownFault { .. } => "sequence.power_down_fault",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            SequenceEvent::StatusChanged { timestamp, .. }
            | SequenceEvent::TestResultAvailable { timestamp, .. }
            | SequenceEvent::StateTransition { timestamp, .. }
            | SequenceEvent::PowerDownFault { timestamp, .. } => *timestamp,
        }
    }

    fn source_name(&self) -> &str {
        match self {
            SequenceEvent::StatusChanged { sequence_name, .. }
            | SequenceEvent::TestResultAvailable { sequence_name, .. }
            | SequenceEvent::StateTransition { sequence_name, .. }
            | SequenceEvent::PowerDownFault { sequence_name, .. } => sequence_name,
        }
    }
}
