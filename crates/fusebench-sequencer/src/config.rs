//! Configuration for the sequence orchestrator.

use crate::events::SequenceEvent;
use crate::result::TestResult;
use crate::state::SequenceState;
use fusebench_circuit::{CircuitParams, TolerancePolicy};
use fusebench_core::{BenchError, EventListener, EventListeners, FnListener};
use fusebench_instrument::Integration;
use std::time::Duration;

#[cfg(feature = "tracing")]
use fusebench_core::BenchEvent;

/// Configuration for a [`SequenceOrchestrator`](crate::SequenceOrchestrator).
#[derive(Debug, Clone)]
pub struct SequencerConfig {
    pub(crate) name: String,
    pub(crate) circuit: CircuitParams,
    pub(crate) tolerance: TolerancePolicy,
    pub(crate) stabilization_delay: Duration,
    pub(crate) inter_case_pause: Duration,
    pub(crate) drive_voltage: f64,
    pub(crate) current_limit: Option<f64>,
    pub(crate) integration: Integration,
    pub(crate) instrument_timeout: Option<Duration>,
    pub(crate) event_listeners: EventListeners<SequenceEvent>,
}

impl SequencerConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> SequencerConfigBuilder {
        SequencerConfigBuilder::new()
    }

    /// Name of this sequencer instance.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Circuit parameters the expected voltages are computed from.
    pub fn circuit(&self) -> &CircuitParams {
        &self.circuit
    }

    /// Tolerance applied to every case.
    pub fn tolerance(&self) -> TolerancePolicy {
        self.tolerance
    }

    /// Wait between programming the sources and reading the meter.
    pub fn stabilization_delay(&self) -> Duration {
        self.stabilization_delay
    }

    /// Wait between two consecutive cases.
    pub fn inter_case_pause(&self) -> Duration {
        self.inter_case_pause
    }

    /// Voltage applied to the source of an active fuse.
    pub fn drive_voltage(&self) -> f64 {
        self.drive_voltage
    }

    pub fn current_limit(&self) -> Option<f64> {
        self.current_limit
    }

    pub fn integration(&self) -> Integration {
        self.integration
    }

    /// Upper bound on any single instrument call, if set.
    pub fn instrument_timeout(&self) -> Option<Duration> {
        self.instrument_timeout
    }

    pub(crate) fn emit(&self, event: SequenceEvent) {
        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
        let panicked = self.event_listeners.emit(&event);

        #[cfg(feature = "tracing")]
        if panicked > 0 {
            tracing::warn!(
                sequence = %self.name,
                event = event.event_type(),
                panicked,
                "event listener panicked"
            );
        }
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        SequencerConfigBuilder::new().build()
    }
}

/// Builder for [`SequencerConfig`].
pub struct SequencerConfigBuilder {
    name: String,
    circuit: CircuitParams,
    tolerance: TolerancePolicy,
    stabilization_delay: Duration,
    inter_case_pause: Duration,
    drive_voltage: f64,
    current_limit: Option<f64>,
    integration: Integration,
    instrument_timeout: Option<Duration>,
    event_listeners: EventListeners<SequenceEvent>,
}

impl SequencerConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            name: String::from("<unnamed>"),
            circuit: CircuitParams::default(),
            tolerance: TolerancePolicy::default(),
            stabilization_delay: Duration::from_millis(100),
            inter_case_pause: Duration::from_millis(300),
            drive_voltage: 24.0,
            current_limit: None,
            integration: Integration::default(),
            instrument_timeout: None,
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the name of this sequencer instance for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the circuit parameters.
    ///
    /// Default: 3.3 V supply, 4.7 kΩ pull-up, fuses 12 kΩ / 24 kΩ / 47 kΩ
    pub fn circuit(mut self, params: CircuitParams) -> Self {
        self.circuit = params;
        self
    }

    /// Sets the tolerance policy.
    ///
    /// Default: 2 % relative plus 5 mV absolute
    pub fn tolerance(mut self, policy: TolerancePolicy) -> Self {
        self.tolerance = policy;
        self
    }

    /// Sets the settling wait after the sources are programmed.
    ///
    /// Default: 100 milliseconds
    pub fn stabilization_delay(mut self, delay: Duration) -> Self {
        self.stabilization_delay = delay;
        self
    }

    /// Sets the pause between cases. No pause follows the last case.
    ///
    /// Default: 300 milliseconds
    pub fn inter_case_pause(mut self, pause: Duration) -> Self {
        self.inter_case_pause = pause;
        self
    }

    /// Sets the voltage driven into an active fuse. Inactive fuses get 0 V.
    ///
    /// Default: 24 V
    pub fn drive_voltage(mut self, volts: f64) -> Self {
        self.drive_voltage = volts;
        self
    }

    /// Programs this current limit on every source before each case.
    ///
    /// Default: none (the source keeps its own setting)
    pub fn current_limit(mut self, amps: f64) -> Self {
        self.current_limit = Some(amps);
        self
    }

    /// Sets the meter integration time.
    ///
    /// Default: 1 NPLC
    pub fn integration(mut self, integration: Integration) -> Self {
        self.integration = integration;
        self
    }

    /// Bounds every instrument call. A call that overruns is reported as an
    /// instrument fault.
    ///
    /// Default: no limit
    pub fn instrument_timeout(mut self, timeout: Duration) -> Self {
        self.instrument_timeout = Some(timeout);
        self
    }

    /// Sets every delay to zero. Useful for tests and benchmarks.
    pub fn without_delays(self) -> Self {
        self.stabilization_delay(Duration::ZERO)
            .inter_case_pause(Duration::ZERO)
    }

    /// Registers a callback for status lines.
    pub fn on_status<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let SequenceEvent::StatusChanged { text, .. } = event {
                f(text);
            }
        }));
        self
    }

    /// Registers a callback for finished test cases.
    pub fn on_result<F>(mut self, f: F) -> Self
    where
        F: Fn(&TestResult) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let SequenceEvent::TestResultAvailable { result, .. } = event {
                f(result);
            }
        }));
        self
    }

    /// Registers a callback for lifecycle transitions.
    pub fn on_state_transition<F>(mut self, f: F) -> Self
    where
        F: Fn(SequenceState, SequenceState) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let SequenceEvent::StateTransition { from, to, .. } = event {
                f(*from, *to);
            }
        }));
        self
    }

    /// Registers a callback for errors suppressed during power-down.
    pub fn on_power_down_fault<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, &BenchError) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let SequenceEvent::PowerDownFault {
                source_index,
                error,
                ..
            } = event
            {
                f(*source_index, error);
            }
        }));
        self
    }

    /// Registers a listener for every event, e.g. an
    /// `tokio::sync::mpsc::UnboundedSender<SequenceEvent>`.
    pub fn listener<L>(mut self, listener: L) -> Self
    where
        L: EventListener<SequenceEvent> + 'static,
    {
        self.event_listeners.add(listener);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> SequencerConfig {
        SequencerConfig {
            name: self.name,
            circuit: self.circuit,
            tolerance: self.tolerance,
            stabilization_delay: self.stabilization_delay,
            inter_case_pause: self.inter_case_pause,
            drive_voltage: self.drive_voltage,
            current_limit: self.current_limit,
            integration: self.integration,
            instrument_timeout: self.instrument_timeout,
            event_listeners: self.event_listeners,
        }
    }
}

impl Default for SequencerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
