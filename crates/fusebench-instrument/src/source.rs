//! Programmable voltage source contract.

use fusebench_core::BenchError;
use std::future::Future;

/// Declared setpoint limits of a voltage source. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceLimits {
    /// Lowest programmable voltage, in volts.
    pub voltage_min: f64,
    /// Highest programmable voltage, in volts.
    pub voltage_max: f64,
    /// Lowest programmable current limit, in amperes.
    pub current_min: f64,
    /// Highest programmable current limit, in amperes.
    pub current_max: f64,
}

impl SourceLimits {
    /// Validates a voltage setpoint.
    pub fn check_voltage(&self, volts: f64) -> Result<(), BenchError> {
        check("voltage", volts, self.voltage_min, self.voltage_max)
    }

    /// Validates a current limit setpoint.
    pub fn check_current(&self, amps: f64) -> Result<(), BenchError> {
        check("current limit", amps, self.current_min, self.current_max)
    }
}

impl Default for SourceLimits {
    /// 0–120 V, 0–0.75 A.
    fn default() -> Self {
        Self {
            voltage_min: 0.0,
            voltage_max: 120.0,
            current_min: 0.0,
            current_max: 0.75,
        }
    }
}

fn check(quantity: &'static str, value: f64, min: f64, max: f64) -> Result<(), BenchError> {
    // NaN fails both comparisons and is rejected too
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(BenchError::range(quantity, value, min, max))
    }
}

/// A controllable DC voltage source.
///
/// Methods take `&self` so one handle can be shared with the worker task that
/// performs the call; implementations serialize access internally. Mutating
/// calls may suspend for the instrument's switching or settling time before
/// returning.
///
/// # Examples
///
/// ```rust
/// use fusebench_core::BenchError;
/// use fusebench_instrument::{SourceLimits, VoltageSource};
/// use std::sync::Mutex;
///
/// /// A source that only remembers its setpoint.
/// #[derive(Default)]
/// struct Ideal {
///     state: Mutex<(bool, f64)>,
/// }
///
/// impl VoltageSource for Ideal {
///     fn limits(&self) -> SourceLimits {
///         SourceLimits::default()
///     }
///
///     async fn enable(&self) -> Result<(), BenchError> {
///         self.state.lock().unwrap().0 = true;
///         Ok(())
///     }
///
///     async fn disable(&self) -> Result<(), BenchError> {
///         self.state.lock().unwrap().0 = false;
///         Ok(())
///     }
///
///     async fn set_voltage(&self, volts: f64) -> Result<(), BenchError> {
///         self.limits().check_voltage(volts)?;
///         self.state.lock().unwrap().1 = volts;
///         Ok(())
///     }
///
///     async fn set_current_limit(&self, amps: f64) -> Result<(), BenchError> {
///         self.limits().check_current(amps)
///     }
///
///     async fn read_back_voltage(&self) -> Result<f64, BenchError> {
///         Ok(self.state.lock().unwrap().1)
///     }
///
///     async fn is_enabled(&self) -> Result<bool, BenchError> {
///         Ok(self.state.lock().unwrap().0)
///     }
/// }
/// ```
pub trait VoltageSource: Send + Sync {
    /// Declared setpoint limits.
    fn limits(&self) -> SourceLimits;

    /// Turns the output on.
    fn enable(&self) -> impl Future<Output = Result<(), BenchError>> + Send;

    /// Turns the output off.
    fn disable(&self) -> impl Future<Output = Result<(), BenchError>> + Send;

    /// Programs the output voltage.
    ///
    /// Fails with [`BenchError::Range`] outside [`SourceLimits`].
    fn set_voltage(&self, volts: f64) -> impl Future<Output = Result<(), BenchError>> + Send;

    /// Programs the output current limit.
    ///
    /// Fails with [`BenchError::Range`] outside [`SourceLimits`].
    fn set_current_limit(&self, amps: f64)
        -> impl Future<Output = Result<(), BenchError>> + Send;

    /// Reads back the programmed output voltage.
    fn read_back_voltage(&self) -> impl Future<Output = Result<f64, BenchError>> + Send;

    /// Reports whether the output is on.
    fn is_enabled(&self) -> impl Future<Output = Result<bool, BenchError>> + Send;
}
