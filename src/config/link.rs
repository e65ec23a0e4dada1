//! Serial link configuration.

use heapless::String;
use serde::Deserialize;

/// Serial connection settings for the motion controller link.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkConfig {
    /// Serial port path (e.g. `/dev/ttyACM0`).
    pub port: String<64>,

    /// Baud rate.
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Per-read timeout in milliseconds.
    ///
    /// Bounds a single poll of the ack-wait loop so the loop can keep
    /// checking for cancellation instead of blocking indefinitely on one
    /// read.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Idle reads tolerated before a command is declared timed out.
    #[serde(default = "default_max_idle_reads")]
    pub max_idle_reads: u32,
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_read_timeout_ms() -> u64 {
    250
}

fn default_max_idle_reads() -> u32 {
    100
}
