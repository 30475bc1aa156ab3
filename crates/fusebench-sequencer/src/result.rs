//! Per-case test results.

use fusebench_circuit::TestCase;
use fusebench_core::BenchError;
use std::time::SystemTime;

/// Outcome of one test case.
///
/// A result is either *measured* (the meter produced a reading and the
/// verdict follows from the case window) or *errored* (an instrument call
/// failed; no reading, never passed).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TestResult {
    test_case: TestCase,
    measured_voltage: Option<f64>,
    passed: bool,
    message: String,
    timestamp: SystemTime,
}

impl TestResult {
    /// Builds a result from a reading, judging it against the case window.
    pub fn measured(test_case: TestCase, measured: f64) -> Self {
        let passed = test_case.evaluate(measured);
        let message = if passed {
            "PASS".to_string()
        } else {
            format!(
                "FAIL: expected {:.3} V ({:.3} to {:.3} V), measured {:.3} V",
                test_case.expected_voltage(),
                test_case.min_voltage(),
                test_case.max_voltage(),
                measured
            )
        };

        Self {
            test_case,
            measured_voltage: Some(measured),
            passed,
            message,
            timestamp: SystemTime::now(),
        }
    }

    /// Builds a failed result for an instrument error.
    pub fn errored(test_case: TestCase, error: &BenchError) -> Self {
        Self {
            test_case,
            measured_voltage: None,
            passed: false,
            message: format!("Error: {error}"),
            timestamp: SystemTime::now(),
        }
    }

    /// The case this result belongs to.
    pub fn test_case(&self) -> &TestCase {
        &self.test_case
    }

    /// Shorthand for `test_case().name()`.
    pub fn name(&self) -> &str {
        self.test_case.name()
    }

    /// The reading, absent when an instrument error occurred.
    pub fn measured_voltage(&self) -> Option<f64> {
        self.measured_voltage
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    /// `true` when no reading was obtained.
    pub fn is_error(&self) -> bool {
        self.measured_voltage.is_none()
    }

    /// `PASS`, a `FAIL: ...` line with expected and measured values, or
    /// `Error: ...`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Wall-clock time the result was produced.
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// `pass`, `fail`, or `error`.
    pub fn verdict(&self) -> &'static str {
        match (self.passed, self.is_error()) {
            (true, _) => "pass",
            (false, false) => "fail",
            (false, true) => "error",
        }
    }
}
