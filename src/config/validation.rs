//! Configuration validation.

use heapless::Vec;

use crate::error::{ConfigError, Result};

use super::SystemConfig;

/// Validate a parsed configuration.
///
/// # Errors
///
/// Returns the first violated constraint: empty port path, zero baud
/// rate, zero read timeout, zero idle-read budget, an empty chip-select
/// map, or one pin wired to two axes.
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    if config.link.port.is_empty() {
        return Err(ConfigError::EmptyPortPath.into());
    }
    if config.link.baud_rate == 0 {
        return Err(ConfigError::InvalidBaudRate(config.link.baud_rate).into());
    }
    if config.link.read_timeout_ms == 0 {
        return Err(ConfigError::InvalidReadTimeout(config.link.read_timeout_ms).into());
    }
    if config.link.max_idle_reads == 0 {
        return Err(ConfigError::InvalidMaxIdleReads(config.link.max_idle_reads).into());
    }

    if config.encoder.chip_selects.is_empty() {
        return Err(ConfigError::EmptyChipSelectMap.into());
    }
    let mut seen: Vec<u8, 4> = Vec::new();
    for (_, &pin) in config.encoder.chip_selects.iter() {
        if seen.contains(&pin) {
            return Err(ConfigError::DuplicateChipSelect { pin }.into());
        }
        let _ = seen.push(pin);
    }

    Ok(())
}
