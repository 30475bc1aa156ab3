//! Acceptance windows around an expected voltage.

/// An inclusive `[min, max]` acceptance band.
///
/// The lower bound is deliberately not clamped at zero: a reading that cannot
/// go negative simply never violates a negative lower bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceWindow {
    min: f64,
    max: f64,
}

impl ToleranceWindow {
    /// Builds the window from a relative tolerance (percent) and an
    /// absolute floor (volts):
    ///
    /// `min = expected·(1 − percent/100) − absolute`,
    /// `max = expected·(1 + percent/100) + absolute`.
    pub fn new(expected: f64, percent: f64, absolute: f64) -> Self {
        Self {
            min: expected * (1.0 - percent / 100.0) - absolute,
            max: expected * (1.0 + percent / 100.0) + absolute,
        }
    }

    /// Lower bound, inclusive.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound, inclusive.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Width of the band.
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Returns `true` if `value` lies inside the band (bounds included).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Tolerance policy shared by every test case of a sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TolerancePolicy {
    /// Relative tolerance, in percent of the expected value.
    pub percent: f64,
    /// Absolute tolerance floor, in volts.
    pub absolute: f64,
}

impl TolerancePolicy {
    /// Creates a policy.
    pub fn new(percent: f64, absolute: f64) -> Self {
        Self { percent, absolute }
    }

    /// Window for `expected` under this policy.
    pub fn window(&self, expected: f64) -> ToleranceWindow {
        ToleranceWindow::new(expected, self.percent, self.absolute)
    }
}

impl Default for TolerancePolicy {
    /// 2 % relative, 5 mV absolute.
    fn default() -> Self {
        Self {
            percent: 2.0,
            absolute: 0.005,
        }
    }
}
