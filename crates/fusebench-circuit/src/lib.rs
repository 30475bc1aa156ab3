//! Circuit model and test case generation for the three-fuse network.
//!
//! Provides:
//! - [`FuseStates`]: the eight drive combinations, bit-encoded F1 = bit 0
//! - [`CircuitModel`]: expected output voltage from [`CircuitParams`]
//! - [`ToleranceWindow`] and [`TolerancePolicy`]: acceptance bands
//! - [`TestCaseGenerator`]: the ordered `Test_01`..`Test_08` case list
//!
//! ## Example
//!
//! ```rust
//! use fusebench_circuit::{CircuitModel, CircuitParams, TestCaseGenerator, TolerancePolicy};
//!
//! let model = CircuitModel::new(CircuitParams::default());
//! let cases = TestCaseGenerator::new(model, TolerancePolicy::default()).build_cases();
//!
//! assert_eq!(cases.len(), 8);
//! assert_eq!(cases[0].name(), "Test_01");
//! assert_eq!(cases[0].expected_voltage(), 3.3);
//! assert!(cases[1].fuse_states().f1);
//! ```
//!
//! ## Feature Flags
//! - `serde`: enables `Serialize`/`Deserialize` for states, parameters, and cases

mod case;
mod fuse;
mod model;
mod tolerance;

pub use case::{TestCase, TestCaseGenerator};
pub use fuse::{FuseStates, COMBINATIONS, FUSE_COUNT};
pub use model::{CircuitModel, CircuitParams};
pub use tolerance::{TolerancePolicy, ToleranceWindow};
