//! Fuse state combinations.

use std::fmt;

/// Number of fuses in the network.
pub const FUSE_COUNT: usize = 3;

/// Number of distinct fuse state combinations.
pub const COMBINATIONS: u8 = 1 << FUSE_COUNT;

/// Drive state of the three fuses.
///
/// `true` means the fuse path is driven (24 V, fault/stress condition),
/// `false` means it is held at 0 V. The bit encoding is F1 = bit 0,
/// F2 = bit 1, F3 = bit 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FuseStates {
    /// Fuse F1.
    pub f1: bool,
    /// Fuse F2.
    pub f2: bool,
    /// Fuse F3.
    pub f3: bool,
}

impl FuseStates {
    /// Creates fuse states from the three individual flags.
    pub const fn new(f1: bool, f2: bool, f3: bool) -> Self {
        Self { f1, f2, f3 }
    }

    /// Decodes a bit-encoded index. Only the low three bits are used.
    pub const fn from_index(index: u8) -> Self {
        Self {
            f1: index & 0b001 != 0,
            f2: index & 0b010 != 0,
            f3: index & 0b100 != 0,
        }
    }

    /// Returns the bit-encoded index (0..=7).
    pub const fn index(&self) -> u8 {
        (self.f1 as u8) | (self.f2 as u8) << 1 | (self.f3 as u8) << 2
    }

    /// Returns the state of fuse `i` (0-based), or `None` if out of range.
    pub fn get(&self, i: usize) -> Option<bool> {
        match i {
            0 => Some(self.f1),
            1 => Some(self.f2),
            2 => Some(self.f3),
            _ => None,
        }
    }

    /// Returns the states as an array ordered F1, F2, F3.
    pub const fn as_array(&self) -> [bool; FUSE_COUNT] {
        [self.f1, self.f2, self.f3]
    }

    /// Iterates the states in F1, F2, F3 order.
    pub fn iter(&self) -> impl Iterator<Item = bool> {
        self.as_array().into_iter()
    }

    /// Returns the number of driven fuses.
    pub fn active_count(&self) -> usize {
        self.iter().filter(|active| *active).count()
    }

    /// Iterates all eight combinations in increasing index order.
    pub fn all() -> impl Iterator<Item = FuseStates> {
        (0..COMBINATIONS).map(FuseStates::from_index)
    }
}

impl From<[bool; FUSE_COUNT]> for FuseStates {
    fn from([f1, f2, f3]: [bool; FUSE_COUNT]) -> Self {
        Self { f1, f2, f3 }
    }
}

impl fmt::Display for FuseStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "F1={} F2={} F3={}",
            self.f1 as u8, self.f2 as u8, self.f3 as u8
        )
    }
}
