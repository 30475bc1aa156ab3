//! Voltmeter contract, metering ranges, and integration settings.

use fusebench_core::BenchError;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Full-scale DC voltage ranges supported by the meter.
///
/// Only these ranges exist; raw values are converted with
/// [`MeterRange::try_from`], which rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeterRange {
    /// 100 mV full scale.
    Millivolts100,
    /// 1 V full scale.
    Volts1,
    /// 10 V full scale.
    Volts10,
    /// 100 V full scale.
    Volts100,
    /// 1 kV full scale.
    Kilovolts1,
}

impl MeterRange {
    /// Every supported range, smallest first.
    pub const ALL: [MeterRange; 5] = [
        MeterRange::Millivolts100,
        MeterRange::Volts1,
        MeterRange::Volts10,
        MeterRange::Volts100,
        MeterRange::Kilovolts1,
    ];

    /// Full-scale value in volts.
    pub const fn full_scale(self) -> f64 {
        match self {
            MeterRange::Millivolts100 => 0.1,
            MeterRange::Volts1 => 1.0,
            MeterRange::Volts10 => 10.0,
            MeterRange::Volts100 => 100.0,
            MeterRange::Kilovolts1 => 1_000.0,
        }
    }

    /// Largest supported range.
    pub const fn largest() -> Self {
        MeterRange::Kilovolts1
    }
}

impl TryFrom<f64> for MeterRange {
    type Error = BenchError;

    fn try_from(full_scale: f64) -> Result<Self, Self::Error> {
        MeterRange::ALL
            .into_iter()
            .find(|range| range.full_scale() == full_scale)
            .ok_or_else(|| {
                BenchError::invalid_argument(format!(
                    "{full_scale} V is not a supported metering range"
                ))
            })
    }
}

impl fmt::Display for MeterRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeterRange::Millivolts100 => write!(f, "100 mV"),
            MeterRange::Volts1 => write!(f, "1 V"),
            MeterRange::Volts10 => write!(f, "10 V"),
            MeterRange::Volts100 => write!(f, "100 V"),
            MeterRange::Kilovolts1 => write!(f, "1 kV"),
        }
    }
}

/// Integration time in number of power-line cycles (NPLC).
///
/// Longer integration averages out more line-frequency noise and takes
/// proportionally longer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Integration {
    /// 0.002 PLC.
    Nplc0_002,
    /// 0.02 PLC.
    Nplc0_02,
    /// 0.2 PLC.
    Nplc0_2,
    /// 1 PLC, rejects line-frequency hum.
    #[default]
    Nplc1,
    /// 10 PLC.
    Nplc10,
}

impl Integration {
    /// Number of power-line cycles.
    pub const fn nplc(self) -> f64 {
        match self {
            Integration::Nplc0_002 => 0.002,
            Integration::Nplc0_02 => 0.02,
            Integration::Nplc0_2 => 0.2,
            Integration::Nplc1 => 1.0,
            Integration::Nplc10 => 10.0,
        }
    }

    /// Integration time at the given line frequency.
    ///
    /// At 50 Hz this spans 40 µs (0.002 PLC) to 200 ms (10 PLC). A line
    /// frequency that is not finite and positive yields zero.
    pub fn duration(self, line_frequency_hz: f64) -> Duration {
        if !(line_frequency_hz.is_finite() && line_frequency_hz > 0.0) {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.nplc() / line_frequency_hz).unwrap_or(Duration::MAX)
    }
}

/// Auxiliary information about what is being measured.
///
/// A simulated meter uses it to synthesize a plausible reading. Real
/// hardware ignores it.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementContext {
    /// Label of the measurement, usually the test case name.
    pub label: String,
    /// Voltage the circuit model predicts at the probe.
    pub expected_voltage: f64,
}

impl MeasurementContext {
    /// Creates a context.
    pub fn new(label: impl Into<String>, expected_voltage: f64) -> Self {
        Self {
            label: label.into(),
            expected_voltage,
        }
    }
}

/// A DC voltmeter.
///
/// The returned reading carries implementation-defined error: bounded and
/// unbiased for simulations, instrument-accurate for real hardware. It may be
/// clamped to `[0, range.full_scale()]`.
pub trait VoltMeter: Send + Sync {
    /// Takes one DC voltage reading.
    ///
    /// Suspends for at least the integration time.
    fn read_voltage(
        &self,
        range: MeterRange,
        integration: Integration,
        context: Option<&MeasurementContext>,
    ) -> impl Future<Output = Result<f64, BenchError>> + Send;
}
