//! Top-level configuration from TOML.

use serde::Deserialize;

use super::{EncoderConfig, LinkConfig};

/// Complete stage-link configuration.
///
/// Two independent sections, one per owned hardware resource: the
/// controller serial link and the decoder bus.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Motion controller serial link.
    pub link: LinkConfig,

    /// Quadrature decoder bus.
    pub encoder: EncoderConfig,
}
