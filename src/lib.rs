//! # stage-link
//!
//! Serial G-code transport and quadrature-decoder readback for motorized
//! positioning stages.
//!
//! ## Features
//!
//! - **Byte-exact completion detection**: ack/keepalive sentinel scanning
//!   with a bounded idle-read budget, so a `send` returns only when the
//!   controller is actually done, physical move included
//! - **Emergency stop on cancellation**: a fired [`CancelToken`] turns the
//!   current wait into a quick-stop before the cancellation propagates
//! - **Independent position readback**: LS7366R-compatible decoder chips
//!   on one shared bus, one chip-enable line per axis
//! - **embedded-hal 1.0**: the decoder driver uses `SpiBus` and
//!   `OutputPin`, and works without the standard library
//! - **Configuration-driven**: link and wiring settings in TOML files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stage_link::{ControllerLink, Ls7366r, Axis};
//!
//! // Load configuration from TOML
//! let config = stage_link::load_config("stage.toml")?;
//!
//! // Talk to the motion controller
//! let mut link = ControllerLink::open(&config.link)?;
//! link.send("G28 O")?;
//! link.send("G0 X10.0 F100")?; // returns after the move finished
//!
//! // Cross-check the position via the decoder
//! let mut decoder = Ls7366r::new(spi, [(Axis::X, cs_x), (Axis::Y, cs_y)])?;
//! let count = decoder.read_counter(Axis::X)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables the serial transport, file I/O and TOML
//!   parsing
//! - `defmt`: Enables defmt formatting of wire-level types for embedded
//!   targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Core modules
pub mod axis;
pub mod config;
pub mod encoder;
pub mod error;
#[cfg(feature = "std")]
pub mod transport;

// Re-exports for ergonomic API
pub use axis::Axis;
pub use config::{validate_config, EncoderConfig, LinkConfig, SystemConfig};
pub use encoder::{ByteWidth, Ls7366r, Mdr0, Mdr1, Status};
pub use error::{Error, Result};
#[cfg(feature = "std")]
pub use transport::{CancelToken, ConnectionState, ControllerLink, SerialLine, SerialPortLine};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::load_config;
