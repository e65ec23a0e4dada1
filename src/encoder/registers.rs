//! Wire-level register value types for the quadrature decoder.
//!
//! Every byte that crosses the bus is built from (or decoded into) one of
//! these types; no raw integer arithmetic happens at call sites. The bit
//! layouts and opcode values follow the decoder chip's documented register
//! map and must not be altered.

/// Transaction opcodes understood by the decoder chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Opcode {
    /// Clear mode register 0
    ClearMdr0 = 0x08,
    /// Clear mode register 1
    ClearMdr1 = 0x10,
    /// Clear the counter
    ClearCounter = 0x20,
    /// Clear the status register
    ClearStatus = 0x30,
    /// Read mode register 0
    ReadMdr0 = 0x48,
    /// Read mode register 1
    ReadMdr1 = 0x50,
    /// Read the counter
    ReadCounter = 0x60,
    /// Read the output register
    ReadOutput = 0x68,
    /// Read the status register
    ReadStatus = 0x70,
    /// Write mode register 0
    WriteMdr0 = 0x88,
    /// Write mode register 1
    WriteMdr1 = 0x90,
    /// Write the data register
    WriteData = 0x98,
    /// Transfer the data register into the counter
    LoadCounter = 0xE0,
    /// Transfer into the output register
    LoadOutput = 0xE4,
}

impl Opcode {
    /// The opcode byte as it appears on the wire.
    #[inline]
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

/// Quadrature counting mode (MDR0 bits 0-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CountMode {
    /// Non-quadrature (count A pulses, B selects direction)
    #[default]
    NonQuadrature,
    /// ×1 quadrature
    Quad1,
    /// ×2 quadrature
    Quad2,
    /// ×4 quadrature (one count per edge of either channel)
    Quad4,
}

impl CountMode {
    const MASK: u8 = 0x03;

    /// Encode into MDR0 bit positions.
    #[inline]
    pub const fn bits(self) -> u8 {
        match self {
            CountMode::NonQuadrature => 0x00,
            CountMode::Quad1 => 0x01,
            CountMode::Quad2 => 0x02,
            CountMode::Quad4 => 0x03,
        }
    }

    /// Decode from an MDR0 byte.
    #[inline]
    pub const fn from_byte(byte: u8) -> Self {
        match byte & Self::MASK {
            0x01 => CountMode::Quad1,
            0x02 => CountMode::Quad2,
            0x03 => CountMode::Quad4,
            _ => CountMode::NonQuadrature,
        }
    }
}

/// Counter run mode (MDR0 bits 2-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunMode {
    /// Count without bounds, wrapping on overflow
    #[default]
    FreeRun,
    /// Count once between limits, then stop
    SingleCycle,
    /// Count only while within the DTR-defined range
    RangeLimit,
    /// Count modulo the DTR value
    ModuloN,
}

impl RunMode {
    const MASK: u8 = 0x0C;

    /// Encode into MDR0 bit positions.
    #[inline]
    pub const fn bits(self) -> u8 {
        match self {
            RunMode::FreeRun => 0x00,
            RunMode::SingleCycle => 0x04,
            RunMode::RangeLimit => 0x08,
            RunMode::ModuloN => 0x0C,
        }
    }

    /// Decode from an MDR0 byte.
    #[inline]
    pub const fn from_byte(byte: u8) -> Self {
        match byte & Self::MASK {
            0x04 => RunMode::SingleCycle,
            0x08 => RunMode::RangeLimit,
            0x0C => RunMode::ModuloN,
            _ => RunMode::FreeRun,
        }
    }
}

/// Index input handling (MDR0 bits 4-5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndexMode {
    /// Index input ignored
    #[default]
    Disabled,
    /// Index loads the counter from the data register
    LoadCounter,
    /// Index resets the counter
    ResetCounter,
    /// Index loads the output register from the counter
    LoadOutput,
}

impl IndexMode {
    const MASK: u8 = 0x30;

    /// Encode into MDR0 bit positions.
    #[inline]
    pub const fn bits(self) -> u8 {
        match self {
            IndexMode::Disabled => 0x00,
            IndexMode::LoadCounter => 0x10,
            IndexMode::ResetCounter => 0x20,
            IndexMode::LoadOutput => 0x30,
        }
    }

    /// Decode from an MDR0 byte.
    #[inline]
    pub const fn from_byte(byte: u8) -> Self {
        match byte & Self::MASK {
            0x10 => IndexMode::LoadCounter,
            0x20 => IndexMode::ResetCounter,
            0x30 => IndexMode::LoadOutput,
            _ => IndexMode::Disabled,
        }
    }
}

/// Quadrature clock filter division factor (MDR0 bit 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockFilter {
    /// Filter clock = system clock
    #[default]
    DivideBy1,
    /// Filter clock = system clock / 2
    DivideBy2,
}

impl ClockFilter {
    const MASK: u8 = 0x80;

    /// Encode into MDR0 bit positions.
    #[inline]
    pub const fn bits(self) -> u8 {
        match self {
            ClockFilter::DivideBy1 => 0x00,
            ClockFilter::DivideBy2 => 0x80,
        }
    }

    /// Decode from an MDR0 byte.
    #[inline]
    pub const fn from_byte(byte: u8) -> Self {
        if byte & Self::MASK != 0 {
            ClockFilter::DivideBy2
        } else {
            ClockFilter::DivideBy1
        }
    }
}

/// Mode register 0: counting behavior configuration.
///
/// Bit 6 (synchronous index) is not modeled and decodes as lost; the
/// driver never sets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mdr0 {
    /// Quadrature counting mode
    pub count_mode: CountMode,
    /// Counter run mode
    pub run_mode: RunMode,
    /// Index input handling
    pub index_mode: IndexMode,
    /// Quadrature clock filter
    pub clock_filter: ClockFilter,
}

impl Mdr0 {
    /// Create a mode register 0 value.
    pub const fn new(
        count_mode: CountMode,
        run_mode: RunMode,
        index_mode: IndexMode,
        clock_filter: ClockFilter,
    ) -> Self {
        Self {
            count_mode,
            run_mode,
            index_mode,
            clock_filter,
        }
    }

    /// Encode into the wire byte.
    #[inline]
    pub const fn to_byte(self) -> u8 {
        self.count_mode.bits()
            | self.run_mode.bits()
            | self.index_mode.bits()
            | self.clock_filter.bits()
    }

    /// Decode from the wire byte.
    #[inline]
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            count_mode: CountMode::from_byte(byte),
            run_mode: RunMode::from_byte(byte),
            index_mode: IndexMode::from_byte(byte),
            clock_filter: ClockFilter::from_byte(byte),
        }
    }
}

/// Counter/register width in bytes (MDR1 bits 0-1).
///
/// The wire encoding runs opposite to the width: `0b00` means 4 bytes and
/// `0b11` means 1 byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteWidth {
    /// 4-byte registers
    #[default]
    Four,
    /// 3-byte registers
    Three,
    /// 2-byte registers
    Two,
    /// 1-byte registers
    One,
}

impl ByteWidth {
    const MASK: u8 = 0x03;

    /// Encode into MDR1 bit positions.
    #[inline]
    pub const fn bits(self) -> u8 {
        match self {
            ByteWidth::Four => 0x00,
            ByteWidth::Three => 0x01,
            ByteWidth::Two => 0x02,
            ByteWidth::One => 0x03,
        }
    }

    /// Decode from an MDR1 byte.
    #[inline]
    pub const fn from_byte(byte: u8) -> Self {
        match byte & Self::MASK {
            0x01 => ByteWidth::Three,
            0x02 => ByteWidth::Two,
            0x03 => ByteWidth::One,
            _ => ByteWidth::Four,
        }
    }

    /// Width as a byte count (1-4).
    #[inline]
    pub const fn bytes(self) -> u8 {
        match self {
            ByteWidth::Four => 4,
            ByteWidth::Three => 3,
            ByteWidth::Two => 2,
            ByteWidth::One => 1,
        }
    }
}

/// Status flags routed to the chip's FLAG output (MDR1 bits 4-7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlagIndicators {
    /// Index event (bit 4)
    pub index: bool,
    /// Compare match (bit 5)
    pub compare: bool,
    /// Borrow / counter underflow (bit 6)
    pub borrow: bool,
    /// Carry / counter overflow (bit 7)
    pub carry: bool,
}

impl FlagIndicators {
    /// Route only the index event to the FLAG output.
    pub const INDEX_ONLY: Self = Self {
        index: true,
        compare: false,
        borrow: false,
        carry: false,
    };

    /// Encode into MDR1 bit positions.
    #[inline]
    pub const fn bits(self) -> u8 {
        (self.index as u8) << 4
            | (self.compare as u8) << 5
            | (self.borrow as u8) << 6
            | (self.carry as u8) << 7
    }

    /// Decode from an MDR1 byte.
    #[inline]
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            index: byte & (1 << 4) != 0,
            compare: byte & (1 << 5) != 0,
            borrow: byte & (1 << 6) != 0,
            carry: byte & (1 << 7) != 0,
        }
    }
}

/// Mode register 1: register width, counting enable, flag routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mdr1 {
    /// Counter/register width
    pub byte_width: ByteWidth,
    /// Whether counting is enabled.
    ///
    /// The wire polarity is inverted: the enable bit (0x04) being *clear*
    /// means counting is *enabled*. This is the chip's documented
    /// semantics, not a bug to fix.
    pub counting_enabled: bool,
    /// Status flags routed to the FLAG output
    pub flag_indicators: FlagIndicators,
}

impl Mdr1 {
    const COUNT_DISABLE_MASK: u8 = 0x04;

    /// Create a mode register 1 value.
    pub const fn new(
        byte_width: ByteWidth,
        counting_enabled: bool,
        flag_indicators: FlagIndicators,
    ) -> Self {
        Self {
            byte_width,
            counting_enabled,
            flag_indicators,
        }
    }

    /// Encode into the wire byte.
    #[inline]
    pub const fn to_byte(self) -> u8 {
        let disable = if self.counting_enabled {
            0x00
        } else {
            Self::COUNT_DISABLE_MASK
        };
        self.byte_width.bits() | disable | self.flag_indicators.bits()
    }

    /// Decode from the wire byte.
    #[inline]
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            byte_width: ByteWidth::from_byte(byte),
            counting_enabled: byte & Self::COUNT_DISABLE_MASK == 0,
            flag_indicators: FlagIndicators::from_byte(byte),
        }
    }
}

/// Decoded status register: 8 independent flags, one per bit.
///
/// No combination is invalid; decoding is a pure bit test per flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// Counter overflow latch (bit 7)
    pub carry: bool,
    /// Counter underflow latch (bit 6)
    pub borrow: bool,
    /// Compare-match latch (bit 5)
    pub compare: bool,
    /// Index latch (bit 4)
    pub index: bool,
    /// Count-enable state (bit 3)
    pub count_enable: bool,
    /// Power-loss latch (bit 2)
    pub pulse: bool,
    /// Count direction: up when set (bit 1)
    pub up_down: bool,
    /// Counter sign (bit 0)
    pub sign: bool,
}

impl Status {
    /// Decode from the wire byte.
    #[inline]
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            carry: byte & (1 << 7) != 0,
            borrow: byte & (1 << 6) != 0,
            compare: byte & (1 << 5) != 0,
            index: byte & (1 << 4) != 0,
            count_enable: byte & (1 << 3) != 0,
            pulse: byte & (1 << 2) != 0,
            up_down: byte & (1 << 1) != 0,
            sign: byte & 1 != 0,
        }
    }

    /// Encode back into the wire byte.
    #[inline]
    pub const fn to_byte(self) -> u8 {
        (self.carry as u8) << 7
            | (self.borrow as u8) << 6
            | (self.compare as u8) << 5
            | (self.index as u8) << 4
            | (self.count_enable as u8) << 3
            | (self.pulse as u8) << 2
            | (self.up_down as u8) << 1
            | self.sign as u8
    }
}
