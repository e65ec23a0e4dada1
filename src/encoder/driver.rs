//! Quadrature decoder driver.
//!
//! Generic over embedded-hal 1.0 bus and pin types. One driver instance
//! owns the shared bus and every per-axis chip-enable line; exclusive
//! access to a transaction is therefore guaranteed by `&mut self`, and a
//! multi-threaded host shares the whole driver behind its own mutex rather
//! than sharing the raw bus.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use heapless::FnvIndexMap;

use crate::axis::Axis;
use crate::error::{EncoderError, Result};

use super::registers::{
    ByteWidth, ClockFilter, CountMode, FlagIndicators, IndexMode, Mdr0, Mdr1, Opcode, RunMode,
    Status,
};

/// Mode register 0 configuration applied at initialization.
const INIT_MDR0: Mdr0 = Mdr0::new(
    CountMode::Quad4,
    RunMode::SingleCycle,
    IndexMode::Disabled,
    ClockFilter::DivideBy2,
);

/// Mode register 1 configuration applied at initialization.
const INIT_MDR1: Mdr1 = Mdr1::new(ByteWidth::Four, true, FlagIndicators::INDEX_ONLY);

/// Driver for an LS7366R-compatible quadrature decoder on a shared bus.
///
/// Each configured axis owns one active-low chip-enable line; the decoder
/// chips share clock and data. Every operation runs as a single
/// transaction: assert exactly one line, transfer opcode and payload or
/// response, flush, deassert.
///
/// Counter, output-register, and data-register transfers are sized by the
/// chip's current byte width, which is re-queried from mode register 1
/// before every such transfer because a stale width would silently corrupt
/// the value.
pub struct Ls7366r<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    /// Shared bus (clock + data for every axis).
    spi: SPI,

    /// Per-axis chip-enable lines, asserted low.
    chip_selects: FnvIndexMap<Axis, CS, 4>,
}

impl<SPI, CS> Ls7366r<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    /// Create a driver and run the per-axis initialization sequence.
    ///
    /// All chip-enable lines are released to their inactive level before
    /// the first transaction. Initialization order over axes is the
    /// canonical X, Y, Z order, restricted to the mapped axes.
    ///
    /// # Errors
    ///
    /// Returns [`EncoderError::DuplicateAxis`] if `chip_selects` maps one
    /// axis twice, or a bus/pin error from the initialization sequence.
    pub fn new<I>(spi: SPI, chip_selects: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Axis, CS)>,
    {
        let mut map: FnvIndexMap<Axis, CS, 4> = FnvIndexMap::new();
        for (axis, cs) in chip_selects {
            if map.contains_key(&axis) {
                return Err(EncoderError::DuplicateAxis(axis).into());
            }
            // Capacity 4 holds the full closed axis set; with duplicates
            // rejected above the insert cannot overflow.
            map.insert(axis, cs)
                .map_err(|_| EncoderError::DuplicateAxis(axis))?;
        }

        let mut driver = Self {
            spi,
            chip_selects: map,
        };
        driver.release_all()?;
        driver.initialize()?;
        Ok(driver)
    }

    /// Re-run the initialization sequence for every mapped axis.
    ///
    /// Per axis, in order: clear MDR0, clear MDR1, clear the counter,
    /// clear the status register, then configure MDR0 (×4 quadrature,
    /// single-cycle, index disabled, filter ÷2) and MDR1 (4-byte width,
    /// counting enabled, index flag indicator). The sequence and register
    /// values match the chip's documented bring-up and must stay
    /// byte-exact.
    pub fn initialize(&mut self) -> Result<()> {
        for axis in Axis::ALL {
            if !self.chip_selects.contains_key(&axis) {
                continue;
            }
            self.clear_mode_register_0(axis)?;
            self.clear_mode_register_1(axis)?;
            self.clear_counter(axis)?;
            self.clear_status(axis)?;
            self.write_mode_register_0(axis, INIT_MDR0)?;
            self.write_mode_register_1(axis, INIT_MDR1)?;
            log::debug!("decoder axis {} initialized", axis);
        }
        Ok(())
    }

    /// Axes this driver has chip-enable lines for.
    pub fn axes(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::ALL
            .into_iter()
            .filter(move |axis| self.chip_selects.contains_key(axis))
    }

    /// Release the bus and chip-enable lines.
    pub fn free(self) -> (SPI, FnvIndexMap<Axis, CS, 4>) {
        (self.spi, self.chip_selects)
    }

    /// Clear mode register 0.
    pub fn clear_mode_register_0(&mut self, axis: Axis) -> Result<()> {
        self.write_op(axis, Opcode::ClearMdr0)
    }

    /// Clear mode register 1.
    pub fn clear_mode_register_1(&mut self, axis: Axis) -> Result<()> {
        self.write_op(axis, Opcode::ClearMdr1)
    }

    /// Clear the counter.
    pub fn clear_counter(&mut self, axis: Axis) -> Result<()> {
        self.write_op(axis, Opcode::ClearCounter)
    }

    /// Clear the status register.
    pub fn clear_status(&mut self, axis: Axis) -> Result<()> {
        self.write_op(axis, Opcode::ClearStatus)
    }

    /// Read and decode mode register 0.
    pub fn read_mode_register_0(&mut self, axis: Axis) -> Result<Mdr0> {
        let mut buf = [0u8; 1];
        self.read_op(axis, Opcode::ReadMdr0, &mut buf)?;
        Ok(Mdr0::from_byte(buf[0]))
    }

    /// Read and decode mode register 1.
    pub fn read_mode_register_1(&mut self, axis: Axis) -> Result<Mdr1> {
        let mut buf = [0u8; 1];
        self.read_op(axis, Opcode::ReadMdr1, &mut buf)?;
        Ok(Mdr1::from_byte(buf[0]))
    }

    /// The chip's current register width.
    pub fn byte_width(&mut self, axis: Axis) -> Result<ByteWidth> {
        Ok(self.read_mode_register_1(axis)?.byte_width)
    }

    /// Whether counting is currently enabled.
    ///
    /// Decoded from mode register 1 with the chip's inverted polarity:
    /// the enable bit being clear means counting is enabled.
    pub fn counting_enabled(&mut self, axis: Axis) -> Result<bool> {
        Ok(self.read_mode_register_1(axis)?.counting_enabled)
    }

    /// Read the counter, sized by the current byte width.
    ///
    /// Issues a fresh MDR1 read first, then clocks in exactly that many
    /// bytes, big-endian. A width reconfigured between the two
    /// transactions cannot be detected (the chip has no NACK); the value
    /// would silently come back wrong-length.
    pub fn read_counter(&mut self, axis: Axis) -> Result<u32> {
        self.read_sized(axis, Opcode::ReadCounter)
    }

    /// Read the output register, sized by the current byte width.
    ///
    /// Same width caveat as [`read_counter`](Self::read_counter).
    pub fn read_output_register(&mut self, axis: Axis) -> Result<u32> {
        self.read_sized(axis, Opcode::ReadOutput)
    }

    /// Read and decode the status register.
    pub fn read_status(&mut self, axis: Axis) -> Result<Status> {
        let mut buf = [0u8; 1];
        self.read_op(axis, Opcode::ReadStatus, &mut buf)?;
        Ok(Status::from_byte(buf[0]))
    }

    /// Write mode register 0.
    pub fn write_mode_register_0(&mut self, axis: Axis, mdr0: Mdr0) -> Result<()> {
        self.write_op_with(axis, Opcode::WriteMdr0, &[mdr0.to_byte()])
    }

    /// Write mode register 1.
    pub fn write_mode_register_1(&mut self, axis: Axis, mdr1: Mdr1) -> Result<()> {
        self.write_op_with(axis, Opcode::WriteMdr1, &[mdr1.to_byte()])
    }

    /// Write the data register, auto-sized to the current byte width.
    ///
    /// # Errors
    ///
    /// Returns [`EncoderError::ValueTooWide`] if `value` does not fit the
    /// chip's configured width.
    pub fn write_data_register(&mut self, axis: Axis, value: u32) -> Result<()> {
        let width = self.byte_width(axis)?.bytes();
        if width < 4 && value >= 1u32 << (8 * width) {
            return Err(EncoderError::ValueTooWide { value, width }.into());
        }
        let bytes = value.to_be_bytes();
        let payload = &bytes[bytes.len() - width as usize..];
        self.write_op_with(axis, Opcode::WriteData, payload)
    }

    /// Transfer the data register into the counter.
    pub fn load_counter_from_data_register(&mut self, axis: Axis) -> Result<()> {
        self.write_op(axis, Opcode::LoadCounter)
    }

    /// Transfer the data register into the output register.
    pub fn load_data_register_to_output_register(&mut self, axis: Axis) -> Result<()> {
        self.write_op(axis, Opcode::LoadOutput)
    }

    /// Variable-length register read: width query, then the sized
    /// transfer, interpreted big-endian.
    fn read_sized(&mut self, axis: Axis, opcode: Opcode) -> Result<u32> {
        let width = self.byte_width(axis)?.bytes() as usize;
        let mut buf = [0u8; 4];
        self.read_op(axis, opcode, &mut buf[..width])?;
        let value = buf[..width]
            .iter()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
        Ok(value)
    }

    /// Single-opcode transaction.
    fn write_op(&mut self, axis: Axis, opcode: Opcode) -> Result<()> {
        self.with_selected(axis, |spi| {
            spi.write(&[opcode.byte()]).map_err(|_| EncoderError::Bus)
        })
    }

    /// Opcode-plus-payload transaction.
    fn write_op_with(&mut self, axis: Axis, opcode: Opcode, payload: &[u8]) -> Result<()> {
        self.with_selected(axis, |spi| {
            spi.write(&[opcode.byte()]).map_err(|_| EncoderError::Bus)?;
            spi.write(payload).map_err(|_| EncoderError::Bus)
        })
    }

    /// Opcode-plus-response transaction.
    fn read_op(&mut self, axis: Axis, opcode: Opcode, buf: &mut [u8]) -> Result<()> {
        self.with_selected(axis, |spi| {
            spi.write(&[opcode.byte()]).map_err(|_| EncoderError::Bus)?;
            spi.read(buf).map_err(|_| EncoderError::Bus)
        })
    }

    /// Run one transaction with exactly one chip-enable line asserted.
    ///
    /// The line is deasserted on every exit path, including transfer
    /// errors; the bus is flushed before release so the final clocks have
    /// landed while the chip is still selected.
    fn with_selected<R>(
        &mut self,
        axis: Axis,
        f: impl FnOnce(&mut SPI) -> core::result::Result<R, EncoderError>,
    ) -> Result<R> {
        let Self { spi, chip_selects } = self;
        let cs = chip_selects
            .get_mut(&axis)
            .ok_or(EncoderError::UnknownAxis(axis))?;

        cs.set_low().map_err(|_| EncoderError::ChipSelect)?;
        let result = f(spi)
            .and_then(|value| spi.flush().map_err(|_| EncoderError::Bus).map(|_| value));
        let released = cs.set_high();

        let value = result?;
        released.map_err(|_| EncoderError::ChipSelect)?;
        Ok(value)
    }

    fn release_all(&mut self) -> Result<()> {
        for (_, cs) in self.chip_selects.iter_mut() {
            cs.set_high().map_err(|_| EncoderError::ChipSelect)?;
        }
        Ok(())
    }
}
