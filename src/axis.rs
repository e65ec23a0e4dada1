//! Stage axis identifiers.
//!
//! The axis set is closed: every axis maps to exactly one chip-enable line
//! on the shared decoder bus, and the motion controller addresses the same
//! axes by letter in G-code words.

use core::fmt;

use serde::Deserialize;

/// One axis of the positioning stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Depth axis.
    Y,
    /// Vertical axis.
    Z,
}

impl Axis {
    /// All axes in canonical order.
    ///
    /// Iteration order matters for the decoder initialization sequence,
    /// which must be deterministic.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// The G-code axis letter.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}
