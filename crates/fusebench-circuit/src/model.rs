//! Parallel-conductance voltage divider model of the fuse network.
//!
//! A pull-up resistor ties the output node to the supply. Every driven fuse
//! adds its resistance in parallel from the output node to the return path,
//! so the output is the divider formed by the pull-up against the parallel
//! combination of the active fuse paths:
//!
//! ```text
//! V_out = Vcc · Rp / (R_pullup + Rp),    Rp = 1 / Σ(1 / R_i) over active fuses
//! ```
//!
//! With no fuse active there is no lower leg and the output sits at `Vcc`.

use crate::fuse::{FuseStates, FUSE_COUNT};

/// Resistor values and supply of the network under test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CircuitParams {
    /// Supply voltage feeding the pull-up, in volts.
    pub supply_voltage: f64,
    /// Pull-up resistance, in ohms.
    pub pullup_ohms: f64,
    /// Fuse path resistances F1, F2, F3, in ohms.
    pub fuse_ohms: [f64; FUSE_COUNT],
}

impl CircuitParams {
    /// Sets the supply voltage.
    pub fn with_supply_voltage(mut self, volts: f64) -> Self {
        self.supply_voltage = volts;
        self
    }

    /// Sets the pull-up resistance.
    pub fn with_pullup_ohms(mut self, ohms: f64) -> Self {
        self.pullup_ohms = ohms;
        self
    }

    /// Sets the fuse path resistances.
    pub fn with_fuse_ohms(mut self, ohms: [f64; FUSE_COUNT]) -> Self {
        self.fuse_ohms = ohms;
        self
    }
}

impl Default for CircuitParams {
    /// 3.3 V supply, 4.7 kΩ pull-up, fuses of 12 kΩ, 24 kΩ and 47 kΩ.
    fn default() -> Self {
        Self {
            supply_voltage: 3.3,
            pullup_ohms: 4_700.0,
            fuse_ohms: [12_000.0, 24_000.0, 47_000.0],
        }
    }
}

/// Computes the expected output voltage for a set of fuse states.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CircuitModel {
    params: CircuitParams,
}

impl CircuitModel {
    /// Creates a model for the given circuit parameters.
    pub fn new(params: CircuitParams) -> Self {
        Self { params }
    }

    /// Returns the circuit parameters.
    pub fn params(&self) -> &CircuitParams {
        &self.params
    }

    /// Expected output voltage with the three fuses in the given states.
    pub fn expected_voltage(&self, f1: bool, f2: bool, f3: bool) -> f64 {
        self.expected_voltage_for(FuseStates::new(f1, f2, f3))
    }

    /// Expected output voltage for a [`FuseStates`] value.
    pub fn expected_voltage_for(&self, states: FuseStates) -> f64 {
        let conductance: f64 = states
            .iter()
            .zip(self.params.fuse_ohms)
            .filter(|(active, _)| *active)
            .map(|(_, ohms)| 1.0 / ohms)
            .sum();

        if conductance == 0.0 {
            return self.params.supply_voltage;
        }

        let parallel = 1.0 / conductance;
        self.params.supply_voltage * parallel / (self.params.pullup_ohms + parallel)
    }
}
