//! Line-oriented serial transport to the motion controller.
//!
//! Delivers textual commands over a full-duplex serial connection and
//! determines, byte-exactly, when each command has actually completed,
//! long-running physical moves included, despite keepalive chatter from
//! a busy controller and an unreliable link.

mod cancel;
mod line;
mod protocol;

pub use cancel::CancelToken;
pub use line::{SerialLine, SerialPortLine};
pub use protocol::{is_movement_command, ConnectionState, ControllerLink, ACK_TOKEN, BUSY_TOKEN};
