//! Integration tests for the controller transport protocol.
//!
//! A scripted in-memory line stands in for the serial port: each write
//! loads the next batch of canned reply lines, each read hands one back
//! (or an empty idle read once the batch runs dry). This drives the
//! ack-wait state machine through every path without hardware.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use stage_link::error::{Error, TransportError};
use stage_link::transport::{CancelToken, ConnectionState, ControllerLink, SerialLine};

#[derive(Default)]
struct LineState {
    /// Reply batches, consumed one per write.
    script: VecDeque<VecDeque<Vec<u8>>>,
    /// Replies pending for the command written last.
    pending: VecDeque<Vec<u8>>,
    /// Every write, as a lossy string.
    written: Vec<String>,
    reads: u32,
    clears: u32,
    /// Fire this token once `reads` reaches the given count.
    cancel_after: Option<(u32, CancelToken)>,
}

/// Scripted serial line. Clones share state so the test can inspect the
/// wire traffic while the link owns the line.
#[derive(Clone, Default)]
struct ScriptedLine(Arc<Mutex<LineState>>);

impl ScriptedLine {
    fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Vec<&'static [u8]>>,
    {
        let state = LineState {
            script: script
                .into_iter()
                .map(|batch| batch.into_iter().map(<[u8]>::to_vec).collect())
                .collect(),
            ..LineState::default()
        };
        Self(Arc::new(Mutex::new(state)))
    }

    fn state(&self) -> MutexGuard<'_, LineState> {
        self.0.lock().unwrap()
    }
}

impl SerialLine for ScriptedLine {
    fn write_all(&mut self, bytes: &[u8]) -> stage_link::Result<()> {
        let mut state = self.state();
        state
            .written
            .push(String::from_utf8_lossy(bytes).into_owned());
        state.pending = state.script.pop_front().unwrap_or_default();
        Ok(())
    }

    fn read_line(&mut self) -> stage_link::Result<Vec<u8>> {
        let mut state = self.state();
        state.reads += 1;
        if let Some((after, token)) = &state.cancel_after {
            if state.reads >= *after {
                token.cancel();
            }
        }
        Ok(state.pending.pop_front().unwrap_or_default())
    }

    fn clear(&mut self) -> stage_link::Result<()> {
        let mut state = self.state();
        state.clears += 1;
        state.pending.clear();
        Ok(())
    }
}

/// Pull the transport error out of a failed send.
fn transport_err(result: stage_link::Result<Vec<u8>>) -> TransportError {
    match result {
        Err(Error::Transport(e)) => e,
        other => panic!("expected transport error, got {:?}", other),
    }
}

/// Wire the line so the link's own token fires after `reads` reads.
fn cancel_link_after(link: &ControllerLink<ScriptedLine>, line: &ScriptedLine, reads: u32) {
    line.state().cancel_after = Some((reads, link.cancel_token()));
}

#[test]
fn test_input_cleared_on_construction() {
    let line = ScriptedLine::new([]);
    let link = ControllerLink::new(line.clone(), 100).unwrap();

    assert_eq!(link.state(), ConnectionState::Idle);
    assert_eq!(line.state().clears, 1);
}

#[test]
fn test_simple_command_acked_once() {
    let line = ScriptedLine::new([vec![
        b"X:0.00 Y:0.00 Z:0.00 E:0.00 Count X:0 Y:0 Z:0\n" as &[u8],
        b"ok\n",
    ]]);
    let mut link = ControllerLink::new(line.clone(), 100).unwrap();

    let response = link.send("M114").unwrap();
    let text = String::from_utf8(response).unwrap();
    assert!(text.contains("X:0.00"));
    assert!(text.ends_with("ok\n"));
    assert_eq!(link.state(), ConnectionState::Acknowledged);
    assert_eq!(line.state().written, vec!["M114\n"]);
}

#[test]
fn test_immediate_ack_reads_exactly_twice() {
    let line = ScriptedLine::new([vec![b"ok\n" as &[u8]]]);
    let mut link = ControllerLink::new(line.clone(), 100).unwrap();

    link.send("G90").unwrap();
    // One read finds the ack, one opportunistic read trails it; the idle
    // counter never gets past the first read.
    assert_eq!(line.state().reads, 2);
}

#[test]
fn test_busy_keepalives_reset_idle_budget() {
    // Budget of 3 idle reads; each keepalive arrives after 2 of them.
    // Without the reset the command would time out long before the ack.
    let line = ScriptedLine::new([vec![
        b"" as &[u8],
        b"",
        b"echo:busy: processing\n",
        b"",
        b"",
        b"echo:busy: processing\n",
        b"",
        b"ok\n",
    ]]);
    let mut link = ControllerLink::new(line, 3).unwrap();

    let response = link.send("G4 S10").unwrap();
    assert_eq!(link.state(), ConnectionState::Acknowledged);
    // Keepalive noise was discarded with the buffer on each reset.
    let text = String::from_utf8(response).unwrap();
    assert!(!text.contains("busy"));
    assert!(text.contains("ok\n"));
}

#[test]
fn test_too_many_idle_reads_between_keepalives_times_out() {
    let line = ScriptedLine::new([vec![
        b"echo:busy: processing\n" as &[u8],
        b"",
        b"",
        b"",
    ]]);
    let mut link = ControllerLink::new(line, 3).unwrap();

    let err = transport_err(link.send("G4 S10"));
    assert!(matches!(err, TransportError::Timeout { tries: 3, .. }));
    assert_eq!(link.state(), ConnectionState::TimedOut);
}

#[test]
fn test_timeout_after_exact_idle_budget() {
    let line = ScriptedLine::new([vec![]]);
    let mut link = ControllerLink::new(line.clone(), 5).unwrap();

    let err = transport_err(link.send("M114"));
    match err {
        TransportError::Timeout { tries, partial } => {
            assert_eq!(tries, 5);
            assert!(partial.is_empty());
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    assert_eq!(link.state(), ConnectionState::TimedOut);
    assert_eq!(line.state().reads, 5);
}

#[test]
fn test_timeout_reports_partial_buffer() {
    let line = ScriptedLine::new([vec![b"echo:start" as &[u8]]]);
    let mut link = ControllerLink::new(line, 2).unwrap();

    let err = transport_err(link.send("M114"));
    match err {
        TransportError::Timeout { partial, .. } => {
            assert_eq!(partial, "echo:start");
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[test]
fn test_movement_command_waits_for_planner_drain() {
    let line = ScriptedLine::new([
        vec![b"ok\n" as &[u8]],
        // Planner-drain ack, delayed as a real move would be
        vec![b"echo:busy: processing\n" as &[u8], b"ok\n"],
    ]);
    let mut link = ControllerLink::new(line.clone(), 100).unwrap();

    link.send("G0 X10.0 F100").unwrap();
    assert_eq!(link.state(), ConnectionState::Acknowledged);
    assert_eq!(line.state().written, vec!["G0 X10.0 F100\n", "M400\n"]);
}

#[test]
fn test_movement_clears_input_before_drain_wait() {
    let line = ScriptedLine::new([vec![b"ok\n" as &[u8]], vec![b"ok\n" as &[u8]]]);
    let mut link = ControllerLink::new(line.clone(), 100).unwrap();

    link.send("G1 Y2.5").unwrap();
    // One clear at construction, one between the move's ack and M400.
    assert_eq!(line.state().clears, 2);
}

#[test]
fn test_non_movement_command_skips_drain() {
    let line = ScriptedLine::new([vec![b"ok\n" as &[u8]]]);
    let mut link = ControllerLink::new(line.clone(), 100).unwrap();

    link.send("G28 O").unwrap();

    let state = line.state();
    assert_eq!(state.written, vec!["G28 O\n"]);
    assert_eq!(state.clears, 1);
}

#[test]
fn test_unknown_command_surfaced_as_error() {
    let line = ScriptedLine::new([vec![
        b"echo:Unknown command: \"M999\"\n" as &[u8],
        b"ok\n",
    ]]);
    let mut link = ControllerLink::new(line, 100).unwrap();

    let err = transport_err(link.send("M999"));
    match err {
        TransportError::UnknownCommand { command, response } => {
            assert_eq!(command, "M999");
            assert!(response.contains("Unknown command"));
        }
        other => panic!("expected unknown-command error, got {:?}", other),
    }
}

#[test]
fn test_trailing_bytes_captured_after_ack() {
    let line = ScriptedLine::new([vec![b"ok\n" as &[u8], b"echo:DEBUG left over\n"]]);
    let mut link = ControllerLink::new(line, 100).unwrap();

    let response = link.send("M111 S7").unwrap();
    let text = String::from_utf8(response).unwrap();
    assert!(text.contains("ok\n"));
    assert!(text.ends_with("echo:DEBUG left over\n"));
}

#[test]
fn test_cancellation_issues_quickstop_then_propagates() {
    let line = ScriptedLine::new([
        vec![],                 // the cancelled command never answers
        vec![b"ok\n" as &[u8]], // the quick-stop does
    ]);
    let mut link = ControllerLink::new(line.clone(), 100).unwrap();
    cancel_link_after(&link, &line, 2);

    let err = transport_err(link.send("G4 S60"));
    assert_eq!(err, TransportError::Cancelled);
    assert_eq!(link.state(), ConnectionState::EmergencyStopped);
    assert_eq!(line.state().written, vec!["G4 S60\n", "M410\n"]);
}

#[test]
fn test_send_after_emergency_stop_is_refused() {
    let line = ScriptedLine::new([vec![], vec![b"ok\n" as &[u8]]]);
    let mut link = ControllerLink::new(line.clone(), 100).unwrap();
    cancel_link_after(&link, &line, 1);

    assert_eq!(transport_err(link.send("G4 S60")), TransportError::Cancelled);

    let before = line.state().written.len();
    assert_eq!(transport_err(link.send("M114")), TransportError::Halted);
    // The refused send never touched the wire.
    assert_eq!(line.state().written.len(), before);
}

#[test]
fn test_cancellation_propagates_even_if_quickstop_times_out() {
    let line = ScriptedLine::new([vec![], vec![]]);
    let mut link = ControllerLink::new(line.clone(), 3).unwrap();
    cancel_link_after(&link, &line, 1);

    let err = transport_err(link.send("G0 Z-1"));
    // Never swallowed into the quick-stop's own timeout.
    assert_eq!(err, TransportError::Cancelled);
    assert_eq!(link.state(), ConnectionState::EmergencyStopped);
    assert_eq!(line.state().written, vec!["G0 Z-1\n", "M410\n"]);
}

#[test]
fn test_explicit_emergency_stop_keeps_link_usable() {
    let line = ScriptedLine::new([vec![b"ok\n" as &[u8]], vec![b"ok\n" as &[u8]]]);
    let mut link = ControllerLink::new(line.clone(), 100).unwrap();

    link.emergency_stop().unwrap();
    assert_eq!(link.state(), ConnectionState::Acknowledged);

    link.send("M114").unwrap();
    assert_eq!(line.state().written, vec!["M410\n", "M114\n"]);
}
