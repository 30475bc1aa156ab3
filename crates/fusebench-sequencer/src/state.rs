//! Sequence lifecycle state.

use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a [`SequenceOrchestrator`](crate::SequenceOrchestrator).
///
/// `Idle → Running → {Completed | Cancelled | Failed}`. A terminal state
/// behaves like `Idle`: the next run starts from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SequenceState {
    /// No run has happened yet.
    Idle,
    /// A run is in progress.
    Running,
    /// The last run went through every case.
    Completed,
    /// The last run stopped on cancellation.
    Cancelled,
    /// The last run stopped on an unexpected error.
    Failed,
}

impl SequenceState {
    /// Returns `true` for `Completed`, `Cancelled`, and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SequenceState::Completed | SequenceState::Cancelled | SequenceState::Failed
        )
    }

    fn encode(self) -> u8 {
        match self {
            SequenceState::Idle => 0,
            SequenceState::Running => 1,
            SequenceState::Completed => 2,
            SequenceState::Cancelled => 3,
            SequenceState::Failed => 4,
        }
    }

    fn decode(encoded: u8) -> Self {
        match encoded {
            0 => SequenceState::Idle,
            1 => SequenceState::Running,
            2 => SequenceState::Completed,
            3 => SequenceState::Cancelled,
            _ => SequenceState::Failed,
        }
    }
}

/// Lock-free holder for the current state.
#[derive(Debug)]
pub(crate) struct StateCell {
    state: AtomicU8,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(SequenceState::Idle.encode()),
        }
    }

    pub(crate) fn get(&self) -> SequenceState {
        SequenceState::decode(self.state.load(Ordering::Acquire))
    }

    /// Moves to `Running` unless already running. Returns the previous state.
    pub(crate) fn try_begin(&self) -> Option<SequenceState> {
        let running = SequenceState::Running.encode();
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if current == running {
                return None;
            }
            match self.state.compare_exchange_weak(
                current,
                running,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(previous) => return Some(SequenceState::decode(previous)),
                Err(actual) => current = actual,
            }
        }
    }

    /// Stores `state`, returning the previous one.
    pub(crate) fn swap(&self, state: SequenceState) -> SequenceState {
        SequenceState::decode(self.state.swap(state.encode(), Ordering::AcqRel))
    }
}
