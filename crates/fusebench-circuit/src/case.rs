//! Test cases and their generation.

use crate::fuse::{FuseStates, COMBINATIONS};
use crate::model::CircuitModel;
use crate::tolerance::{TolerancePolicy, ToleranceWindow};

/// One fuse state combination with its expected output and tolerance.
///
/// Built once by [`TestCaseGenerator`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestCase {
    name: String,
    fuse_states: FuseStates,
    expected_voltage: f64,
    tolerance_percent: f64,
    absolute_tolerance: f64,
}

impl TestCase {
    /// Creates a test case.
    pub fn new(
        name: impl Into<String>,
        fuse_states: FuseStates,
        expected_voltage: f64,
        policy: TolerancePolicy,
    ) -> Self {
        Self {
            name: name.into(),
            fuse_states,
            expected_voltage,
            tolerance_percent: policy.percent,
            absolute_tolerance: policy.absolute,
        }
    }

    /// Stable identifier, e.g. `Test_03`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fuse states driven for this case.
    pub fn fuse_states(&self) -> FuseStates {
        self.fuse_states
    }

    /// Expected output voltage.
    pub fn expected_voltage(&self) -> f64 {
        self.expected_voltage
    }

    /// Relative tolerance, in percent.
    pub fn tolerance_percent(&self) -> f64 {
        self.tolerance_percent
    }

    /// Absolute tolerance, in volts.
    pub fn absolute_tolerance(&self) -> f64 {
        self.absolute_tolerance
    }

    /// Acceptance window, computed on demand.
    pub fn window(&self) -> ToleranceWindow {
        ToleranceWindow::new(
            self.expected_voltage,
            self.tolerance_percent,
            self.absolute_tolerance,
        )
    }

    /// Lower acceptance bound.
    pub fn min_voltage(&self) -> f64 {
        self.window().min()
    }

    /// Upper acceptance bound.
    pub fn max_voltage(&self) -> f64 {
        self.window().max()
    }

    /// Returns `true` if `measured` is inside the acceptance window.
    pub fn evaluate(&self, measured: f64) -> bool {
        self.window().contains(measured)
    }
}

/// Builds the full, ordered case list for a circuit.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestCaseGenerator {
    model: CircuitModel,
    policy: TolerancePolicy,
}

impl TestCaseGenerator {
    /// Creates a generator for the given model and tolerance policy.
    pub fn new(model: CircuitModel, policy: TolerancePolicy) -> Self {
        Self { model, policy }
    }

    /// Returns the eight cases `Test_01`..`Test_08` in bit-encoded order.
    ///
    /// Case N drives the fuse states of index N−1, F1 being the least
    /// significant bit.
    pub fn build_cases(&self) -> Vec<TestCase> {
        (0..COMBINATIONS)
            .map(|index| {
                let states = FuseStates::from_index(index);
                TestCase::new(
                    format!("Test_{:02}", index + 1),
                    states,
                    self.model.expected_voltage_for(states),
                    self.policy,
                )
            })
            .collect()
    }
}
