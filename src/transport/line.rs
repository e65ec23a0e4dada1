//! Byte source/sink abstraction for the controller link.
//!
//! The protocol engine is generic over [`SerialLine`] so the ack-wait
//! state machine can be driven by a scripted in-memory line in tests.
//! [`SerialPortLine`] is the real backend over an OS serial port.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::ClearBuffer;

use crate::config::LinkConfig;
use crate::error::{Result, TransportError};

/// Line-granular access to the serial link.
pub trait SerialLine {
    /// Write all bytes and flush them out.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read one line, waiting at most the link's per-read timeout.
    ///
    /// An empty result means nothing arrived before the timeout (an idle
    /// read). A non-empty result without a trailing newline means the line
    /// was cut off mid-transmission; the caller accumulates across reads.
    fn read_line(&mut self) -> Result<Vec<u8>>;

    /// Flush pending output and discard buffered unread input.
    fn clear(&mut self) -> Result<()>;
}

/// [`SerialLine`] over an OS serial port.
pub struct SerialPortLine {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialPortLine {
    /// Open the port described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] if the port cannot be opened.
    pub fn open(config: &LinkConfig) -> Result<Self> {
        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .open()
            .map_err(|e| TransportError::Io(e.to_string()))?;
        Ok(Self { port })
    }
}

impl SerialLine for SerialPortLine {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.port
            .write_all(bytes)
            .and_then(|_| self.port.flush())
            .map_err(|e| TransportError::Io(e.to_string()))?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Vec<u8>> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    line.push(byte[0]);
                    if byte[0] == b'\n' {
                        break;
                    }
                }
                // Timeout bounds the poll; partial bytes stay in `line`
                // and the caller's accumulation buffer picks them up.
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransportError::Io(e.to_string()).into()),
            }
        }
        Ok(line)
    }

    fn clear(&mut self) -> Result<()> {
        self.port
            .flush()
            .map_err(|e| TransportError::Io(e.to_string()))?;
        self.port
            .clear(ClearBuffer::Input)
            .map_err(|e| TransportError::Io(e.to_string()))?;
        Ok(())
    }
}
