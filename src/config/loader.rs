//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::SystemConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
///
/// ```rust,ignore
/// use stage_link::load_config;
///
/// let config = load_config("stage.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SystemConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(e.to_string().as_str()).unwrap_or_default();
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<SystemConfig> {
    let config: SystemConfig = toml::from_str(content).map_err(|e| {
        let msg = heapless::String::try_from(e.message()).unwrap_or_default();
        Error::Config(ConfigError::ParseError(msg))
    })?;

    // Validate the configuration
    super::validation::validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Axis;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[link]
port = "/dev/ttyACM0"

[encoder.chip_selects]
x = 23
y = 24
"#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.link.port.as_str(), "/dev/ttyACM0");
        assert_eq!(config.encoder.chip_select(Axis::Y), Some(24));
    }

    #[test]
    fn test_parse_rejects_invalid() {
        let toml = r#"
[link]
port = "/dev/ttyACM0"
baud_rate = 0

[encoder.chip_selects]
x = 23
"#;

        assert!(parse_config(toml).is_err());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[link]
port = "/dev/ttyUSB0"
baud_rate = 115200
read_timeout_ms = 250
max_idle_reads = 100

[encoder.chip_selects]
x = 23
y = 24
z = 25
"#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.link.max_idle_reads, 100);
        let axes: Vec<_> = config.encoder.axes().collect();
        assert_eq!(axes, vec![Axis::X, Axis::Y, Axis::Z]);
    }
}
