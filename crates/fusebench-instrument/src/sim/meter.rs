//! Simulated DC voltmeter.

use crate::meter::{Integration, MeasurementContext, MeterRange, VoltMeter};
use fusebench_core::BenchError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// A voltmeter that synthesizes readings from the measurement context.
///
/// Each reading:
/// - suspends for the integration time at the configured line frequency
/// - fails with [`BenchError::InstrumentFault`] with probability `fault_rate`
/// - adds uniform, zero-mean noise of amplitude
///   `(noise_fraction·|expected| + noise_floor) / √NPLC`
/// - is clamped to `[0, range.full_scale()]`
///
/// Without a context the meter reads its idle value (0 V by default) plus
/// noise.
///
/// # Examples
///
/// ```rust
/// use fusebench_instrument::sim::SimulatedVoltMeter;
/// use fusebench_instrument::{Integration, MeasurementContext, MeterRange, VoltMeter};
///
/// # async fn example() {
/// let meter = SimulatedVoltMeter::builder()
///     .name("DMM")
///     .seed(42)
///     .build();
///
/// let context = MeasurementContext::new("Test_01", 3.3);
/// let volts = meter
///     .read_voltage(MeterRange::Volts10, Integration::Nplc1, Some(&context))
///     .await
///     .unwrap();
/// assert!((volts - 3.3).abs() < 0.01);
/// # }
/// ```
pub struct SimulatedVoltMeter {
    name: String,
    line_frequency: f64,
    noise_fraction: f64,
    noise_floor: f64,
    fault_rate: f64,
    idle_reading: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedVoltMeter {
    /// Creates a new builder.
    pub fn builder() -> SimulatedVoltMeterBuilder {
        SimulatedVoltMeterBuilder::new()
    }

    /// Name of this meter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Largest deviation from the true value a reading can carry.
    pub fn noise_amplitude(&self, true_value: f64, integration: Integration) -> f64 {
        (self.noise_fraction * true_value.abs() + self.noise_floor) / integration.nplc().sqrt()
    }

    /// Draws the fault decision and the noise sample under one lock.
    fn sample(&self, amplitude: f64) -> Option<f64> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());

        if self.fault_rate > 0.0 && rng.random::<f64>() < self.fault_rate {
            return None;
        }

        if amplitude > 0.0 {
            Some(rng.random_range(-amplitude..=amplitude))
        } else {
            Some(0.0)
        }
    }
}

impl VoltMeter for SimulatedVoltMeter {
    async fn read_voltage(
        &self,
        range: MeterRange,
        integration: Integration,
        context: Option<&MeasurementContext>,
    ) -> Result<f64, BenchError> {
        let true_value = context.map_or(self.idle_reading, |ctx| ctx.expected_voltage);
        let amplitude = self.noise_amplitude(true_value, integration);
        let sample = self.sample(amplitude);

        tokio::time::sleep(integration.duration(self.line_frequency)).await;

        let Some(noise) = sample else {
            #[cfg(feature = "tracing")]
            warn!(meter = %self.name, "simulated measurement fault");

            return Err(BenchError::fault(
                self.name.clone(),
                "measurement failed: no trigger response",
            ));
        };

        let reading = (true_value + noise).clamp(0.0, range.full_scale());

        #[cfg(feature = "tracing")]
        debug!(
            meter = %self.name,
            range = %range,
            nplc = integration.nplc(),
            reading,
            "simulated reading"
        );

        Ok(reading)
    }
}

impl std::fmt::Debug for SimulatedVoltMeter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedVoltMeter")
            .field("name", &self.name)
            .field("line_frequency", &self.line_frequency)
            .field("noise_fraction", &self.noise_fraction)
            .field("noise_floor", &self.noise_floor)
            .field("fault_rate", &self.fault_rate)
            .finish()
    }
}

/// Builder for [`SimulatedVoltMeter`].
pub struct SimulatedVoltMeterBuilder {
    name: String,
    line_frequency: f64,
    noise_fraction: f64,
    noise_floor: f64,
    fault_rate: f64,
    idle_reading: f64,
    seed: Option<u64>,
}

impl SimulatedVoltMeterBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            name: "<unnamed>".to_string(),
            line_frequency: 50.0,
            noise_fraction: 0.002,
            noise_floor: 100e-6,
            fault_rate: 0.0,
            idle_reading: 0.0,
            seed: None,
        }
    }

    /// Sets the instrument name.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the power-line frequency used to convert NPLC into time.
    ///
    /// Values that are not finite and positive are ignored.
    ///
    /// Default: 50 Hz
    pub fn line_frequency(mut self, hz: f64) -> Self {
        if hz.is_finite() && hz > 0.0 {
            self.line_frequency = hz;
        }
        self
    }

    /// Sets the noise amplitude relative to the reading, at 1 NPLC.
    ///
    /// Default: 0.002 (0.2 %)
    pub fn noise_fraction(mut self, fraction: f64) -> Self {
        self.noise_fraction = fraction.max(0.0);
        self
    }

    /// Sets the absolute noise amplitude, at 1 NPLC.
    ///
    /// Default: 100 µV
    pub fn noise_floor(mut self, volts: f64) -> Self {
        self.noise_floor = volts.max(0.0);
        self
    }

    /// Disables noise entirely; readings equal the true value (after clamping).
    pub fn noiseless(self) -> Self {
        self.noise_fraction(0.0).noise_floor(0.0)
    }

    /// Sets the probability (0.0 - 1.0) that a reading fails.
    ///
    /// Default: 0.0
    pub fn fault_rate(mut self, rate: f64) -> Self {
        self.fault_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the true value read when no measurement context is given.
    ///
    /// Default: 0 V
    pub fn idle_reading(mut self, volts: f64) -> Self {
        self.idle_reading = volts;
        self
    }

    /// Seeds the random generator for reproducible readings.
    ///
    /// Default: seeded from the operating system
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the meter.
    pub fn build(self) -> SimulatedVoltMeter {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        SimulatedVoltMeter {
            name: self.name,
            line_frequency: self.line_frequency,
            noise_fraction: self.noise_fraction,
            noise_floor: self.noise_floor,
            fault_rate: self.fault_rate,
            idle_reading: self.idle_reading,
            rng: Mutex::new(rng),
        }
    }
}

impl Default for SimulatedVoltMeterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
