//! Simulated programmable voltage source.

use crate::source::{SourceLimits, VoltageSource};
use fusebench_core::BenchError;
use std::sync::Mutex;
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::trace;

#[derive(Debug, Default, Clone, Copy)]
struct OutputState {
    enabled: bool,
    voltage: f64,
    current_limit: f64,
}

/// A voltage source that validates setpoints and models settling time.
///
/// Every mutating call sleeps for the configured settle delay before the new
/// state takes effect.
///
/// # Examples
///
/// ```rust
/// use fusebench_instrument::sim::SimulatedVoltageSource;
/// use fusebench_instrument::VoltageSource;
/// use std::time::Duration;
///
/// # async fn example() {
/// let source = SimulatedVoltageSource::builder()
///     .name("V1")
///     .settle_delay(Duration::from_millis(5))
///     .build();
///
/// source.set_voltage(24.0).await.unwrap();
/// source.enable().await.unwrap();
/// assert_eq!(source.read_back_voltage().await.unwrap(), 24.0);
/// assert!(source.set_voltage(121.0).await.unwrap_err().is_range());
/// # }
/// ```
#[derive(Debug)]
pub struct SimulatedVoltageSource {
    name: String,
    limits: SourceLimits,
    settle_delay: Duration,
    state: Mutex<OutputState>,
}

impl SimulatedVoltageSource {
    /// Creates a new builder.
    pub fn builder() -> SimulatedVoltageSourceBuilder {
        SimulatedVoltageSourceBuilder::new()
    }

    /// Name of this source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Programmed current limit.
    pub fn current_limit(&self) -> f64 {
        self.snapshot().current_limit
    }

    fn snapshot(&self) -> OutputState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update(&self, f: impl FnOnce(&mut OutputState)) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state);
    }

    async fn settle(&self) {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
    }
}

impl VoltageSource for SimulatedVoltageSource {
    fn limits(&self) -> SourceLimits {
        self.limits
    }

    async fn enable(&self) -> Result<(), BenchError> {
        self.settle().await;
        self.update(|s| s.enabled = true);

        #[cfg(feature = "tracing")]
        trace!(source = %self.name, "output enabled");

        Ok(())
    }

    async fn disable(&self) -> Result<(), BenchError> {
        self.settle().await;
        self.update(|s| s.enabled = false);

        #[cfg(feature = "tracing")]
        trace!(source = %self.name, "output disabled");

        Ok(())
    }

    async fn set_voltage(&self, volts: f64) -> Result<(), BenchError> {
        self.limits.check_voltage(volts)?;
        self.settle().await;
        self.update(|s| s.voltage = volts);

        #[cfg(feature = "tracing")]
        trace!(source = %self.name, volts, "voltage programmed");

        Ok(())
    }

    async fn set_current_limit(&self, amps: f64) -> Result<(), BenchError> {
        self.limits.check_current(amps)?;
        self.settle().await;
        self.update(|s| s.current_limit = amps);
        Ok(())
    }

    async fn read_back_voltage(&self) -> Result<f64, BenchError> {
        Ok(self.snapshot().voltage)
    }

    async fn is_enabled(&self) -> Result<bool, BenchError> {
        Ok(self.snapshot().enabled)
    }
}

/// Builder for [`SimulatedVoltageSource`].
pub struct SimulatedVoltageSourceBuilder {
    name: String,
    limits: SourceLimits,
    settle_delay: Duration,
}

impl SimulatedVoltageSourceBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            name: "<unnamed>".to_string(),
            limits: SourceLimits::default(),
            settle_delay: Duration::from_millis(10),
        }
    }

    /// Sets the instrument name.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the programmable limits.
    ///
    /// Default: 0–120 V, 0–0.75 A
    pub fn limits(mut self, limits: SourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the delay applied to every mutating call.
    ///
    /// Default: 10 ms
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Builds the source, output off at 0 V.
    pub fn build(self) -> SimulatedVoltageSource {
        SimulatedVoltageSource {
            name: self.name,
            limits: self.limits,
            settle_delay: self.settle_delay,
            state: Mutex::new(OutputState::default()),
        }
    }
}

impl Default for SimulatedVoltageSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
