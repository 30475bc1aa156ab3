//! The sequence orchestrator.

use crate::config::SequencerConfig;
use crate::error::SequenceError;
use crate::events::SequenceEvent;
use crate::power::{Bench, PowerDownGuard};
use crate::protocol::execute_case;
use crate::state::{SequenceState, StateCell};
use fusebench_circuit::{CircuitModel, TestCase, TestCaseGenerator};
use fusebench_core::CancellationSignal;
use fusebench_instrument::{VoltMeter, VoltageSource};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinHandle;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_histogram, histogram};

#[cfg(feature = "tracing")]
use tracing::{debug, info, warn};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every case produced a result.
    Completed,
    /// Cancellation was requested before the last case finished.
    Cancelled,
    /// An unexpected error stopped the run.
    Failed {
        /// Description of the error.
        reason: String,
    },
}

impl RunOutcome {
    /// The terminal state this outcome leaves the orchestrator in.
    pub fn state(&self) -> SequenceState {
        match self {
            RunOutcome::Completed => SequenceState::Completed,
            RunOutcome::Cancelled => SequenceState::Cancelled,
            RunOutcome::Failed { .. } => SequenceState::Failed,
        }
    }

    /// `completed`, `cancelled`, or `failed`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Completed => "completed",
            RunOutcome::Cancelled => "cancelled",
            RunOutcome::Failed { .. } => "failed",
        }
    }
}

/// Drives the eight-case test sequence over three sources and one meter.
///
/// The case list is built once at construction from the configured circuit
/// and tolerance. Only one run may be active at a time; a finished
/// orchestrator can be started again.
pub struct SequenceOrchestrator<S, M>
where
    S: VoltageSource + 'static,
    M: VoltMeter + 'static,
{
    bench: Bench<S, M>,
    config: Arc<SequencerConfig>,
    cases: Vec<TestCase>,
    state: StateCell,
    active_signal: Mutex<Option<CancellationSignal>>,
}

impl<S, M> SequenceOrchestrator<S, M>
where
    S: VoltageSource + 'static,
    M: VoltMeter + 'static,
{
    /// Creates an orchestrator for sources F1, F2, F3 (in that order) and a meter.
    pub fn new(sources: [Arc<S>; 3], meter: Arc<M>, config: SequencerConfig) -> Self {
        #[cfg(feature = "metrics")]
        {
            describe_counter!(
                "fusebench_runs_total",
                "Total number of sequence runs by outcome (completed, cancelled, failed)"
            );
            describe_counter!(
                "fusebench_cases_total",
                "Total number of test cases by result (pass, fail, error)"
            );
            describe_histogram!(
                "fusebench_case_duration_seconds",
                "Wall time of one test case, power-down included"
            );
            describe_counter!(
                "fusebench_power_down_faults_total",
                "Total number of errors suppressed while powering sources down"
            );
        }

        let model = CircuitModel::new(config.circuit);
        let cases = TestCaseGenerator::new(model, config.tolerance).build_cases();

        Self {
            bench: Bench { sources, meter },
            config: Arc::new(config),
            cases,
            state: StateCell::new(),
            active_signal: Mutex::new(None),
        }
    }

    /// The ordered case list, `Test_01` first.
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SequenceState {
        self.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.state() == SequenceState::Running
    }

    /// The sources, F1 first.
    pub fn sources(&self) -> &[Arc<S>; 3] {
        &self.bench.sources
    }

    pub fn meter(&self) -> &Arc<M> {
        &self.bench.meter
    }

    /// Requests cancellation of the active run.
    ///
    /// Returns `false` if no run is active. The run stops at its next
    /// suspension point; an instrument call already in flight completes.
    pub fn cancel(&self) -> bool {
        let slot = self
            .active_signal
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(signal) => {
                signal.cancel();
                true
            }
            None => false,
        }
    }

    /// Runs every case in order.
    ///
    /// Returns [`SequenceError::AlreadyRunning`] if a run is active. Every
    /// other ending, cancellation included, is reported as a [`RunOutcome`];
    /// in all cases the sources are powered down before this returns.
    pub async fn start(&self) -> Result<RunOutcome, SequenceError> {
        self.start_with_signal(CancellationSignal::new()).await
    }

    /// Like [`start`](Self::start), observing an externally owned signal.
    ///
    /// A signal that is already cancelled yields a run with no results.
    pub async fn start_with_signal(
        &self,
        signal: CancellationSignal,
    ) -> Result<RunOutcome, SequenceError> {
        let run = self.begin(signal.clone())?;

        let guard = PowerDownGuard::arm(self.bench.clone(), Arc::clone(&self.config));
        let result = self.run_cases(&signal).await;
        guard.release().await;

        let outcome = match result {
            Ok(()) => {
                self.emit_status("All tests completed");
                RunOutcome::Completed
            }
            Err(SequenceError::Cancelled) => {
                self.emit_status("Test sequence cancelled");
                RunOutcome::Cancelled
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                warn!(sequence = %self.config.name, error = %err, "test sequence failed");

                self.emit_status(format!("Error: {err}"));
                RunOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };

        #[cfg(feature = "tracing")]
        info!(
            sequence = %self.config.name,
            outcome = outcome.as_str(),
            "test sequence finished"
        );

        #[cfg(feature = "metrics")]
        counter!(
            "fusebench_runs_total",
            "sequence" => self.config.name.clone(),
            "outcome" => outcome.as_str()
        )
        .increment(1);

        run.finish(outcome.state());
        Ok(outcome)
    }

    /// Starts a run on a new tokio task.
    ///
    /// The orchestrator stays usable from other tasks, e.g. to
    /// [`cancel`](Self::cancel) the run.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<Result<RunOutcome, SequenceError>> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.start().await })
    }

    fn begin(&self, signal: CancellationSignal) -> Result<ActiveRun<'_, S, M>, SequenceError> {
        let mut slot = self
            .active_signal
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let previous = self.state.try_begin().ok_or(SequenceError::AlreadyRunning)?;
        *slot = Some(signal);
        drop(slot);

        self.emit_transition(previous, SequenceState::Running);
        Ok(ActiveRun {
            orchestrator: self,
            finished: false,
        })
    }

    async fn run_cases(&self, signal: &CancellationSignal) -> Result<(), SequenceError> {
        let total = self.cases.len();
        self.emit_status("Initializing test sequence");
        self.emit_status(format!("Starting test sequence ({total} cases)"));

        for (index, case) in self.cases.iter().enumerate() {
            if signal.is_cancelled() {
                return Err(SequenceError::Cancelled);
            }

            self.emit_status(format!("Running {} ({}/{})", case.name(), index + 1, total));

            #[cfg(feature = "tracing")]
            debug!(
                sequence = %self.config.name,
                case = case.name(),
                fuses = %case.fuse_states(),
                expected = case.expected_voltage(),
                "running test case"
            );

            #[cfg(feature = "metrics")]
            let started = Instant::now();

            let result = execute_case(&self.bench, &self.config, case, signal).await?;

            #[cfg(feature = "metrics")]
            {
                histogram!(
                    "fusebench_case_duration_seconds",
                    "sequence" => self.config.name.clone()
                )
                .record(started.elapsed().as_secs_f64());
                counter!(
                    "fusebench_cases_total",
                    "sequence" => self.config.name.clone(),
                    "result" => result.verdict()
                )
                .increment(1);
            }

            #[cfg(feature = "tracing")]
            info!(
                sequence = %self.config.name,
                case = result.name(),
                passed = result.passed(),
                measured = ?result.measured_voltage(),
                "{}",
                result.message()
            );

            self.config.emit(SequenceEvent::TestResultAvailable {
                sequence_name: self.config.name.clone(),
                timestamp: Instant::now(),
                result,
            });

            if index + 1 < total {
                signal
                    .sleep(self.config.inter_case_pause)
                    .await
                    .map_err(|_| SequenceError::Cancelled)?;
            }
        }

        Ok(())
    }

    fn emit_status(&self, text: impl Into<String>) {
        self.config.emit(SequenceEvent::StatusChanged {
            sequence_name: self.config.name.clone(),
            timestamp: Instant::now(),
            text: text.into(),
        });
    }

    fn emit_transition(&self, from: SequenceState, to: SequenceState) {
        #[cfg(feature = "tracing")]
        debug!(sequence = %self.config.name, ?from, ?to, "state transition");

        self.config.emit(SequenceEvent::StateTransition {
            sequence_name: self.config.name.clone(),
            timestamp: Instant::now(),
            from,
            to,
        });
    }
}

impl<S, M> std::fmt::Debug for SequenceOrchestrator<S, M>
where
    S: VoltageSource + 'static,
    M: VoltMeter + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceOrchestrator")
            .field("name", &self.config.name)
            .field("state", &self.state())
            .field("cases", &self.cases.len())
            .finish()
    }
}

/// Marks one run as active; clears it when the run ends.
///
/// Dropped without [`finish`](Self::finish) (the run future was dropped),
/// the run counts as cancelled.
struct ActiveRun<'a, S, M>
where
    S: VoltageSource + 'static,
    M: VoltMeter + 'static,
{
    orchestrator: &'a SequenceOrchestrator<S, M>,
    finished: bool,
}

impl<S, M> ActiveRun<'_, S, M>
where
    S: VoltageSource + 'static,
    M: VoltMeter + 'static,
{
    fn finish(mut self, state: SequenceState) {
        self.finished = true;
        self.close(state);
    }

    fn close(&self, state: SequenceState) {
        let orchestrator = self.orchestrator;
        let mut slot = orchestrator
            .active_signal
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        *slot = None;
        let previous = orchestrator.state.swap(state);
        drop(slot);

        orchestrator.emit_transition(previous, state);
    }
}

impl<S, M> Drop for ActiveRun<'_, S, M>
where
    S: VoltageSource + 'static,
    M: VoltMeter + 'static,
{
    fn drop(&mut self) {
        if !self.finished {
            self.close(SequenceState::Cancelled);
        }
    }
}
