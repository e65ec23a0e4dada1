//! Ack-wait protocol to the G-code motion controller.
//!
//! The controller answers every command with an `ok` line, and emits
//! periodic busy keepalives while a long command is still executing
//! (`HOST_KEEPALIVE_FEATURE` with a one-second interval on the firmware
//! side). The wait loop here turns that chatter into a byte-exact
//! completion signal with a bounded idle-read budget.

use crate::error::{Result, TransportError};

use super::cancel::CancelToken;
use super::line::{SerialLine, SerialPortLine};
use crate::config::LinkConfig;

/// Keepalive sentinel emitted while the controller is still working.
pub const BUSY_TOKEN: &[u8] = b"echo:busy: processing\n";

/// Acknowledgment sentinel ending a command.
pub const ACK_TOKEN: &[u8] = b"ok\n";

/// Echo prefix the controller uses to reject a command it cannot parse.
const UNKNOWN_COMMAND_ECHO: &[u8] = b"echo:Unknown command";

/// Drains the motion planner; acked only once all queued moves finished.
const FINISH_MOVES_COMMAND: &str = "M400";

/// Stops motion immediately while keeping the controller responsive.
const QUICK_STOP_COMMAND: &str = "M410";

/// Command prefixes whose execution time is bounded by physical motion.
const MOVE_PREFIXES: [&str; 2] = ["G0", "G1"];

/// Whether a command is a movement command.
///
/// Movement commands are acked as soon as the controller queues them, so
/// they get a secondary completion wait (see [`ControllerLink::send`]).
pub fn is_movement_command(command: &str) -> bool {
    MOVE_PREFIXES
        .iter()
        .any(|prefix| command.starts_with(prefix))
}

/// Protocol state of the link, per command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No command in flight.
    Idle,
    /// Command written; polling for the ack token.
    AwaitingAck,
    /// Keepalive seen; controller alive and still executing.
    Busy,
    /// Ack token received; terminal success for the command.
    Acknowledged,
    /// Idle-read budget exhausted; terminal failure for the command.
    TimedOut,
    /// Cancellation triggered a quick-stop; terminal for the link.
    EmergencyStopped,
}

/// Serial transport to the motion controller.
///
/// Owns the link exclusively: `send` is blocking, synchronous, and
/// at-most-one-in-flight by `&mut self`. Hosts with several logical
/// callers serialize them around the whole link (e.g. a mutex).
pub struct ControllerLink<L: SerialLine> {
    line: L,
    state: ConnectionState,
    max_idle_reads: u32,
    cancel: CancelToken,
}

impl ControllerLink<SerialPortLine> {
    /// Open the configured serial port and bind a link to it.
    ///
    /// The port's input buffer is cleared before the first command so
    /// stale bytes from a previous session are never parsed as part of a
    /// response.
    pub fn open(config: &LinkConfig) -> Result<Self> {
        let line = SerialPortLine::open(config)?;
        log::info!(
            "opened controller port {} at {} baud",
            config.port,
            config.baud_rate
        );
        Self::new(line, config.max_idle_reads)
    }
}

impl<L: SerialLine> ControllerLink<L> {
    /// Bind a link to an already-open line.
    ///
    /// Clears the line first; see [`ControllerLink::open`].
    pub fn new(mut line: L, max_idle_reads: u32) -> Result<Self> {
        line.clear()?;
        Ok(Self {
            line,
            state: ConnectionState::Idle,
            max_idle_reads,
            cancel: CancelToken::new(),
        })
    }

    /// Current protocol state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// A clone of the link's cancellation token.
    ///
    /// Fire it from an interrupt handler to turn the current wait into an
    /// emergency stop.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Send one command and wait for its acknowledgment.
    ///
    /// Returns the full accumulated response verbatim, including any
    /// keepalive chatter captured alongside the final lines. For movement
    /// commands the call additionally clears the input buffer, sends the
    /// planner-drain command and waits for its ack too, so the caller
    /// never observes success before the physical move has finished.
    ///
    /// # Errors
    ///
    /// [`TransportError::Timeout`] when the idle-read budget runs out,
    /// [`TransportError::UnknownCommand`] when the controller rejects the
    /// command, [`TransportError::Cancelled`] when the token fired
    /// mid-wait (a quick-stop is issued first), [`TransportError::Halted`]
    /// when the link was already emergency-stopped.
    pub fn send(&mut self, command: &str) -> Result<Vec<u8>> {
        if self.state == ConnectionState::EmergencyStopped {
            return Err(TransportError::Halted.into());
        }

        let response = self.submit(command)?;

        if is_movement_command(command) {
            // The ack only means the move was queued. Drop any remaining
            // chatter, then block on the planner drain.
            self.line.clear()?;
            self.submit(FINISH_MOVES_COMMAND)?;
        }

        Ok(response)
    }

    /// Stop motion immediately, outside the cancellation path.
    ///
    /// Runs the normal ack-wait for the stop command. The link stays
    /// usable afterwards; only a cancellation-triggered stop is terminal.
    pub fn emergency_stop(&mut self) -> Result<()> {
        log::error!("emergency stop requested");
        self.submit(QUICK_STOP_COMMAND)?;
        Ok(())
    }

    /// Flush pending output and discard buffered unread input.
    pub fn clear(&mut self) -> Result<()> {
        self.line.clear()
    }

    /// Close the link, releasing the port.
    pub fn close(self) -> Result<()> {
        log::info!("closing controller link");
        Ok(())
    }

    /// Write one framed command and run the ack-wait for it.
    fn submit(&mut self, command: &str) -> Result<Vec<u8>> {
        log::debug!("write to controller: {}", command);
        let mut framed = String::with_capacity(command.len() + 1);
        framed.push_str(command);
        framed.push('\n');
        self.line.write_all(framed.as_bytes())?;

        self.state = ConnectionState::AwaitingAck;
        let response = self.wait_acknowledged(true)?;

        if contains_token(&response, UNKNOWN_COMMAND_ECHO) {
            return Err(TransportError::UnknownCommand {
                command: command.to_string(),
                response: String::from_utf8_lossy(&response).into_owned(),
            }
            .into());
        }

        Ok(response)
    }

    /// Accumulate reads until the ack token arrives or the idle budget
    /// runs out.
    ///
    /// `honor_cancel` is false only for the quick-stop's own ack-wait,
    /// which must not re-enter the cancellation path.
    fn wait_acknowledged(&mut self, honor_cancel: bool) -> Result<Vec<u8>> {
        let mut buffer: Vec<u8> = Vec::new();
        let mut idle_reads = 0u32;

        loop {
            if honor_cancel && self.cancel.is_cancelled() {
                return self.abort_on_cancel();
            }
            if self.state == ConnectionState::Busy {
                self.state = ConnectionState::AwaitingAck;
            }

            buffer.extend_from_slice(&self.line.read_line()?);

            if contains_token(&buffer, BUSY_TOKEN) {
                // Evidence the controller is alive and still working:
                // restart the idle budget and drop the keepalive noise.
                self.state = ConnectionState::Busy;
                idle_reads = 0;
                buffer.clear();
                continue;
            }
            if contains_token(&buffer, ACK_TOKEN) {
                self.state = ConnectionState::Acknowledged;
                break;
            }

            idle_reads += 1;
            if idle_reads >= self.max_idle_reads {
                self.state = ConnectionState::TimedOut;
                let partial = String::from_utf8_lossy(&buffer).into_owned();
                log::warn!(
                    "no acknowledgment after {} idle reads; partial response: {:?}",
                    idle_reads,
                    partial
                );
                return Err(TransportError::Timeout {
                    tries: idle_reads,
                    partial,
                }
                .into());
            }
        }

        // One opportunistic read for bytes trailing the ack.
        buffer.extend_from_slice(&self.line.read_line()?);
        log::debug!(
            "read from controller: {:?}",
            String::from_utf8_lossy(&buffer)
        );
        Ok(buffer)
    }

    /// Cancellation observed mid-wait: stop the hardware, then surface
    /// the cancellation.
    ///
    /// The quick-stop bypasses `send` (no movement handling, no halt
    /// check) and its ack-wait runs with cancellation checks suppressed.
    /// Its outcome is best-effort: the cancellation propagates even if
    /// the stop's own ack never arrives.
    fn abort_on_cancel(&mut self) -> Result<Vec<u8>> {
        log::error!("cancelled while awaiting controller; issuing quick-stop");

        let mut framed = String::with_capacity(QUICK_STOP_COMMAND.len() + 1);
        framed.push_str(QUICK_STOP_COMMAND);
        framed.push('\n');
        let stopped = self
            .line
            .write_all(framed.as_bytes())
            .and_then(|_| self.wait_acknowledged(false));
        if let Err(e) = stopped {
            log::warn!("quick-stop acknowledgment not confirmed: {}", e);
        }

        self.state = ConnectionState::EmergencyStopped;
        Err(TransportError::Cancelled.into())
    }
}

/// Byte-exact token scan over the accumulation buffer.
fn contains_token(haystack: &[u8], token: &[u8]) -> bool {
    haystack.windows(token.len()).any(|window| window == token)
}
