//! Error types for the stage-link library.
//!
//! Provides unified error handling across configuration, the serial
//! transport, and the decoder register protocol.

use core::fmt;

use crate::axis::Axis;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stage-link operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Serial transport error
    #[cfg(feature = "std")]
    Transport(TransportError),
    /// Decoder register protocol error
    Encoder(EncoderError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Serial port path is empty
    EmptyPortPath,
    /// Invalid baud rate (must be > 0)
    InvalidBaudRate(u32),
    /// Invalid per-read timeout (must be > 0)
    InvalidReadTimeout(u64),
    /// Invalid idle-read budget (must be > 0)
    InvalidMaxIdleReads(u32),
    /// No chip-select lines configured for the decoder
    EmptyChipSelectMap,
    /// Two axes share one chip-select pin
    DuplicateChipSelect {
        /// The doubly-assigned pin number
        pin: u8,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Serial transport errors.
#[cfg(feature = "std")]
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// No acknowledgment arrived within the idle-read budget
    Timeout {
        /// Idle reads consumed before giving up
        tries: u32,
        /// Whatever accumulated in the buffer, for diagnostics
        partial: String,
    },
    /// The controller echoed an unknown-command notice
    UnknownCommand {
        /// The command that was sent
        command: String,
        /// The controller's full response
        response: String,
    },
    /// The wait loop was cancelled; a quick-stop was issued first
    Cancelled,
    /// Send attempted after an emergency stop halted the link
    Halted,
    /// Port-level I/O failure
    Io(String),
}

/// Decoder register protocol errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderError {
    /// Bus transfer failed
    Bus,
    /// Chip-enable line operation failed
    ChipSelect,
    /// Axis has no chip-enable line on this driver
    UnknownAxis(Axis),
    /// Axis appears twice in the chip-enable mapping
    DuplicateAxis(Axis),
    /// Value does not fit the currently configured byte width
    ValueTooWide {
        /// The rejected value
        value: u32,
        /// Configured register width in bytes
        width: u8,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            #[cfg(feature = "std")]
            Error::Transport(e) => write!(f, "Transport error: {}", e),
            Error::Encoder(e) => write!(f, "Encoder error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::EmptyPortPath => write!(f, "Serial port path is empty"),
            ConfigError::InvalidBaudRate(v) => {
                write!(f, "Invalid baud rate: {}. Must be > 0", v)
            }
            ConfigError::InvalidReadTimeout(v) => {
                write!(f, "Invalid read timeout: {} ms. Must be > 0", v)
            }
            ConfigError::InvalidMaxIdleReads(v) => {
                write!(f, "Invalid idle-read budget: {}. Must be > 0", v)
            }
            ConfigError::EmptyChipSelectMap => {
                write!(f, "No chip-select lines configured")
            }
            ConfigError::DuplicateChipSelect { pin } => {
                write!(f, "Chip-select pin {} assigned to more than one axis", pin)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout { tries, partial } => {
                write!(
                    f,
                    "No acknowledgment after {} idle reads (partial response: {:?})",
                    tries, partial
                )
            }
            TransportError::UnknownCommand { command, response } => {
                write!(
                    f,
                    "Controller rejected '{}' as unknown (response: {:?})",
                    command, response
                )
            }
            TransportError::Cancelled => {
                write!(f, "Wait cancelled; quick-stop issued")
            }
            TransportError::Halted => {
                write!(f, "Link halted by emergency stop")
            }
            TransportError::Io(msg) => write!(f, "Serial I/O error: {}", msg),
        }
    }
}

impl fmt::Display for EncoderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncoderError::Bus => write!(f, "Bus transfer failed"),
            EncoderError::ChipSelect => write!(f, "Chip-enable line operation failed"),
            EncoderError::UnknownAxis(axis) => {
                write!(f, "Axis {} has no chip-enable line", axis)
            }
            EncoderError::DuplicateAxis(axis) => {
                write!(f, "Axis {} mapped to more than one chip-enable line", axis)
            }
            EncoderError::ValueTooWide { value, width } => {
                write!(
                    f,
                    "Value {} does not fit the configured {}-byte register width",
                    value, width
                )
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

#[cfg(feature = "std")]
impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

impl From<EncoderError> for Error {
    fn from(e: EncoderError) -> Self {
        Error::Encoder(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for TransportError {}

#[cfg(feature = "std")]
impl std::error::Error for EncoderError {}
