//! Integration tests for the sequence orchestrator.
//!
//! The doubles here record every instrument call so tests can check the
//! exact protocol, and can be scripted to fail, panic, or hang on a chosen
//! case.

pub mod cancellation;
pub mod lifecycle;

use fusebench_core::BenchError;
use fusebench_instrument::{
    Integration, MeasurementContext, MeterRange, SourceLimits, VoltMeter, VoltageSource,
};
use fusebench_sequencer::{
    SequenceEvent, SequenceOrchestrator, SequencerConfig, SequencerConfigBuilder, TestResult,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// One call received by a [`FakeSource`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetCurrentLimit(f64),
    SetVoltage(f64),
    Enable,
    Disable,
}

/// A voltage source that records calls and never sleeps.
#[derive(Default)]
pub struct FakeSource {
    calls: Mutex<Vec<Call>>,
    enabled: AtomicBool,
    voltage: Mutex<f64>,
    fail_disable: AtomicBool,
}

impl FakeSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A source whose `disable` always fails.
    pub fn failing_disable() -> Arc<Self> {
        let source = Self::default();
        source.fail_disable.store(true, Ordering::SeqCst);
        Arc::new(source)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_on(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn volts(&self) -> f64 {
        *self.voltage.lock().unwrap()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl VoltageSource for FakeSource {
    fn limits(&self) -> SourceLimits {
        SourceLimits::default()
    }

    async fn enable(&self) -> Result<(), BenchError> {
        self.record(Call::Enable);
        self.enabled.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disable(&self) -> Result<(), BenchError> {
        self.record(Call::Disable);
        if self.fail_disable.load(Ordering::SeqCst) {
            return Err(BenchError::fault("fake source", "output relay stuck"));
        }
        self.enabled.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn set_voltage(&self, volts: f64) -> Result<(), BenchError> {
        self.limits().check_voltage(volts)?;
        self.record(Call::SetVoltage(volts));
        *self.voltage.lock().unwrap() = volts;
        Ok(())
    }

    async fn set_current_limit(&self, amps: f64) -> Result<(), BenchError> {
        self.limits().check_current(amps)?;
        self.record(Call::SetCurrentLimit(amps));
        Ok(())
    }

    async fn read_back_voltage(&self) -> Result<f64, BenchError> {
        Ok(self.volts())
    }

    async fn is_enabled(&self) -> Result<bool, BenchError> {
        Ok(self.is_on())
    }
}

/// A meter that reads the expected voltage of the case (plus an offset).
#[derive(Default)]
pub struct ExactMeter {
    offset: f64,
    fail_on: Option<&'static str>,
    panic_on: Option<&'static str>,
    hang_on: Option<&'static str>,
    reads: Mutex<Vec<(String, MeterRange, Integration)>>,
}

impl ExactMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(mut self, volts: f64) -> Self {
        self.offset = volts;
        self
    }

    pub fn failing_on(mut self, case: &'static str) -> Self {
        self.fail_on = Some(case);
        self
    }

    pub fn panicking_on(mut self, case: &'static str) -> Self {
        self.panic_on = Some(case);
        self
    }

    pub fn hanging_on(mut self, case: &'static str) -> Self {
        self.hang_on = Some(case);
        self
    }

    pub fn reads(&self) -> Vec<(String, MeterRange, Integration)> {
        self.reads.lock().unwrap().clone()
    }
}

impl VoltMeter for ExactMeter {
    async fn read_voltage(
        &self,
        range: MeterRange,
        integration: Integration,
        context: Option<&MeasurementContext>,
    ) -> Result<f64, BenchError> {
        let Some(context) = context else {
            return Ok(0.0);
        };
        let label = context.label.as_str();
        self.reads
            .lock()
            .unwrap()
            .push((label.to_string(), range, integration));

        if self.panic_on == Some(label) {
            panic!("meter exploded");
        }
        if self.hang_on == Some(label) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail_on == Some(label) {
            return Err(BenchError::fault("DMM", "no trigger response"));
        }
        Ok(context.expected_voltage + self.offset)
    }
}

pub type Rig = SequenceOrchestrator<FakeSource, ExactMeter>;

/// Builds an orchestrator over three fresh sources.
pub fn rig(meter: ExactMeter, config: SequencerConfig) -> (Arc<Rig>, [Arc<FakeSource>; 3]) {
    rig_with_sources([FakeSource::new(), FakeSource::new(), FakeSource::new()], meter, config)
}

pub fn rig_with_sources(
    sources: [Arc<FakeSource>; 3],
    meter: ExactMeter,
    config: SequencerConfig,
) -> (Arc<Rig>, [Arc<FakeSource>; 3]) {
    let orchestrator = SequenceOrchestrator::new(sources.clone(), Arc::new(meter), config);
    (Arc::new(orchestrator), sources)
}

/// Adds a channel listener to `builder` and returns the receiving end.
pub fn with_channel(
    builder: SequencerConfigBuilder,
) -> (SequencerConfig, UnboundedReceiver<SequenceEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (builder.listener(tx).build(), rx)
}

pub fn drain(rx: &mut UnboundedReceiver<SequenceEvent>) -> Vec<SequenceEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn statuses(events: &[SequenceEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            SequenceEvent::StatusChanged { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

pub fn results(events: &[SequenceEvent]) -> Vec<TestResult> {
    events
        .iter()
        .filter_map(|event| match event {
            SequenceEvent::TestResultAvailable { result, .. } => Some(result.clone()),
            _ => None,
        })
        .collect()
}

pub fn assert_powered_down(sources: &[Arc<FakeSource>; 3]) {
    for (index, source) in sources.iter().enumerate() {
        assert!(!source.is_on(), "source {index} left enabled");
        assert_eq!(source.volts(), 0.0, "source {index} left at {} V", source.volts());
    }
}
