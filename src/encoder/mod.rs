//! Register-level protocol driver for the quadrature decoder.
//!
//! Independent position readback for the stage: an LS7366R-compatible
//! decoder chip per axis on one shared synchronous serial bus, addressed
//! purely via per-axis chip-enable lines. Split into byte-exact wire
//! value types and the transaction-scoped driver itself.

mod driver;
mod registers;

pub use driver::Ls7366r;
pub use registers::{
    ByteWidth, ClockFilter, CountMode, FlagIndicators, IndexMode, Mdr0, Mdr1, Opcode, RunMode,
    Status,
};
