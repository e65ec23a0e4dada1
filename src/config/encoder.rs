//! Decoder bus configuration.

use heapless::FnvIndexMap;
use serde::Deserialize;

use crate::axis::Axis;

/// Chip-select wiring for the quadrature decoder bus.
///
/// Maps each wired axis to its chip-enable pin number. The pin numbers
/// document the wiring and let validation catch assignment mistakes; the
/// driver itself is handed constructed pin instances, one per mapped
/// axis.
#[derive(Debug, Clone, Deserialize)]
pub struct EncoderConfig {
    /// Axis to chip-select pin assignment (BCM numbering).
    pub chip_selects: FnvIndexMap<Axis, u8, 4>,
}

impl EncoderConfig {
    /// The chip-select pin wired to `axis`, if any.
    pub fn chip_select(&self, axis: Axis) -> Option<u8> {
        self.chip_selects.get(&axis).copied()
    }

    /// Wired axes, in canonical order.
    pub fn axes(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::ALL
            .into_iter()
            .filter(|axis| self.chip_selects.contains_key(axis))
    }
}
