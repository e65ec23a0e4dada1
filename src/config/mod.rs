//! Configuration module for stage-link.
//!
//! Provides types for loading and validating link and decoder-bus
//! settings from TOML files (with `std` feature) or pre-parsed data.

mod encoder;
mod link;
#[cfg(feature = "std")]
mod loader;
mod system;
mod validation;

pub use encoder::EncoderConfig;
pub use link::LinkConfig;
pub use system::SystemConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};
