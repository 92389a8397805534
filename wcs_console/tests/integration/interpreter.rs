//! Operator loop scenarios over scripted input.

use super::backend::{RecordingBackend, axis_paths};
use std::io::{self, Cursor, Write};
use std::time::Duration;
use wcs_common::axis::Axis;
use wcs_common::config::ConsoleSettings;
use wcs_common::hal::backend::{AxisHandle, BackendError};
use wcs_console::input::{CancelFlag, ReaderSource};
use wcs_console::interpreter::Flow;
use wcs_console::{CommandInterpreter, ConsoleError, ExitReason, Session};

const X: AxisHandle = AxisHandle::new(0);
const Y: AxisHandle = AxisHandle::new(1);
const Z: AxisHandle = AxisHandle::new(2);

fn no_settle() -> ConsoleSettings {
    ConsoleSettings {
        settle_ms: 0,
        show_absolute: false,
    }
}

/// Run a full session over `script`; returns the exit reason and the output.
fn run_script(backend: &RecordingBackend, script: &str) -> (ExitReason, String) {
    run_with(backend, no_settle(), CancelFlag::new(), script)
}

fn run_with(
    backend: &RecordingBackend,
    settings: ConsoleSettings,
    cancel: CancelFlag,
    script: &str,
) -> (ExitReason, String) {
    let session = Session::open(backend.clone(), &axis_paths()).unwrap();
    let mut out = Vec::new();
    let mut input = ReaderSource::new(Cursor::new(script.to_string()));
    let reason = CommandInterpreter::new(session, settings, &mut out, cancel)
        .run(&mut input)
        .unwrap();
    (reason, String::from_utf8(out).unwrap())
}

#[test]
fn zero_then_move_in_work_frame() {
    let backend = RecordingBackend::new();
    backend.set_position(Axis::X, 0.200);

    let (reason, out) = run_script(&backend, "zero x\nx 50\nq\n");

    assert_eq!(reason, ExitReason::Quit);
    let targets = backend.targets();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].0, X);
    assert!((targets[0].1 - 0.250).abs() < 1e-12);

    assert!(out.contains("X zeroed at 200.0 mm (machine)"));
    assert!(out.contains("[X:0.0 Y:0.0 Z:0.0] > "));
    assert!(out.contains("X -> 50.0 mm (machine 250.0 mm)"));
    assert!(out.contains("[X:50.0 Y:0.0 Z:0.0] > "));
}

#[test]
fn first_prompt_shows_machine_positions_before_any_zero() {
    let backend = RecordingBackend::new();
    backend.set_position(Axis::X, 0.2);
    backend.set_position(Axis::Z, -0.0125);

    let (_, out) = run_script(&backend, "q\n");

    assert!(out.starts_with("--- WCS CONSOLE READY ---"));
    assert!(out.contains("[X:200.0 Y:0.0 Z:-12.5] > "));
}

#[test]
fn move_without_offset_converts_mm_exactly() {
    let backend = RecordingBackend::new();

    run_script(&backend, "x 150\n");

    assert_eq!(backend.targets(), vec![(X, 0.150)]);
}

#[test]
fn home_ignores_offsets() {
    let backend = RecordingBackend::new();
    backend.set_position(Axis::X, 0.2);
    backend.set_position(Axis::Y, 0.1);

    let (_, out) = run_script(&backend, "zero all\nhome\nq\n");

    assert_eq!(backend.targets(), vec![(X, 0.0), (Y, 0.0), (Z, 0.0)]);
    assert!(out.contains("Homing all axes to machine zero"));
    // Offsets survive homing, so machine zero reads negative in work frame.
    assert!(out.contains("[X:-200.0 Y:-100.0 Z:0.0] > "));
}

#[test]
fn zero_all_reports_every_axis_in_order() {
    let backend = RecordingBackend::new();
    backend.set_position(Axis::X, 0.01);
    backend.set_position(Axis::Y, 0.02);
    backend.set_position(Axis::Z, 0.03);

    let (_, out) = run_script(&backend, "zero tudo\nq\n");

    let x = out.find("X zeroed at 10.0 mm").unwrap();
    let y = out.find("Y zeroed at 20.0 mm").unwrap();
    let z = out.find("Z zeroed at 30.0 mm").unwrap();
    assert!(x < y && y < z);
    assert!(out.contains("[X:0.0 Y:0.0 Z:0.0] > "));
}

#[test]
fn invalid_input_leaves_state_unchanged() {
    let backend = RecordingBackend::new();
    backend.set_position(Axis::X, 0.2);
    let session = Session::open(backend.clone(), &axis_paths()).unwrap();
    let mut out = Vec::new();
    let mut console = CommandInterpreter::new(session, no_settle(), &mut out, CancelFlag::new());

    console.execute_line("zero x").unwrap();
    let before = console.session().offsets().clone();

    assert!(matches!(
        console.execute_line("x"),
        Err(ConsoleError::MalformedCommand(_))
    ));
    assert!(matches!(
        console.execute_line("w 10"),
        Err(ConsoleError::InvalidAxis(ref axis)) if axis == "w"
    ));
    assert!(matches!(
        console.execute_line("x abc"),
        Err(ConsoleError::MalformedCommand(_))
    ));
    assert!(matches!(
        console.execute_line("dance"),
        Err(ConsoleError::MalformedCommand(_))
    ));

    assert_eq!(console.session().offsets(), &before);
    assert!(backend.targets().is_empty());
}

#[test]
fn diagnostics_do_not_end_the_loop() {
    let backend = RecordingBackend::new();

    let (reason, out) = run_script(&backend, "w 10\nx abc\nx\ny 5\nq\n");

    assert_eq!(reason, ExitReason::Quit);
    assert!(out.contains("error: invalid axis 'w' (use x, y or z)"));
    assert!(out.contains("error: malformed command: 'abc' is not a number"));
    assert!(out.contains("error: malformed command: 'x' takes 1 argument(s), got 0"));
    assert_eq!(backend.targets(), vec![(Y, 0.005)]);
}

#[test]
fn blank_lines_reprompt_silently() {
    let backend = RecordingBackend::new();

    let (reason, out) = run_script(&backend, "\n   \n\t\nq\n");

    assert_eq!(reason, ExitReason::Quit);
    assert!(!out.contains("error:"));
    assert_eq!(out.matches("] > ").count(), 4);
}

#[test]
fn failed_move_is_reported_and_loop_continues() {
    let backend = RecordingBackend::new();
    backend.set_position(Axis::Y, 0.03);
    backend.state().write_error =
        Some(BackendError::CommunicationError("write refused".to_string()));

    let (reason, out) = run_script(&backend, "x 10\nzero y\nq\n");

    assert_eq!(reason, ExitReason::Quit);
    assert!(out.contains("error: backend unavailable: Backend communication error: write refused"));
    assert!(out.contains("Y zeroed at 30.0 mm (machine)"));
    assert_eq!(backend.state().stops, 1);
}

#[test]
fn timed_out_move_warns_set_point_may_apply() {
    let backend = RecordingBackend::new();
    backend.state().write_error = Some(BackendError::Timeout(Duration::from_secs(2)));

    let (reason, out) = run_script(&backend, "x 10\nq\n");

    assert_eq!(reason, ExitReason::Quit);
    assert!(out.contains("error: backend unavailable: Backend call timed out after 2s"));
    assert!(out.contains("a set-point may still be applied"));
}

#[test]
fn invalid_utf8_line_is_reported_and_loop_continues() {
    let backend = RecordingBackend::new();
    let session = Session::open(backend.clone(), &axis_paths()).unwrap();
    let mut out = Vec::new();
    let mut input = ReaderSource::new(Cursor::new(b"x 10\ny \xff\xfe\nz 5\nq\n".to_vec()));

    let reason = CommandInterpreter::new(session, no_settle(), &mut out, CancelFlag::new())
        .run(&mut input)
        .unwrap();

    assert_eq!(reason, ExitReason::Quit);
    assert_eq!(backend.targets(), vec![(X, 0.01), (Z, 0.005)]);
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("error: malformed command: input is not valid UTF-8"));
    assert_eq!(backend.state().stops, 1);
}

#[test]
fn failed_reads_leave_offsets_untouched() {
    let backend = RecordingBackend::new();
    let session = Session::open(backend.clone(), &axis_paths()).unwrap();
    let mut out = Vec::new();
    let mut console = CommandInterpreter::new(session, no_settle(), &mut out, CancelFlag::new());

    backend.set_position(Axis::X, 0.1);
    backend.state().unreadable.push(Z);

    assert!(matches!(
        console.execute_line("zero all"),
        Err(ConsoleError::BackendUnavailable(_))
    ));
    assert_eq!(console.session().offsets().offset(Axis::X), 0.0);

    assert_eq!(console.execute_line("zero x").unwrap(), Flow::Continue);
    assert_eq!(console.session().offsets().offset(Axis::X), 0.1);
}

#[test]
fn unreadable_status_shows_offline_prompt() {
    let backend = RecordingBackend::new();
    backend.fail_reads();

    let (reason, out) = run_script(&backend, "zero x\nq\n");

    assert_eq!(reason, ExitReason::Quit);
    assert!(out.contains("[offline] > "));
    assert!(out.contains("error: backend unavailable"));
}

#[test]
fn absolute_positions_on_request() {
    let backend = RecordingBackend::new();
    backend.set_position(Axis::X, 0.2);
    let settings = ConsoleSettings {
        settle_ms: 0,
        show_absolute: true,
    };

    let (_, out) = run_with(&backend, settings, CancelFlag::new(), "zero x\nq\n");

    assert!(out.contains("[X:0.0 (abs 200.0) Y:0.0 (abs 0.0) Z:0.0 (abs 0.0)] > "));
}

#[test]
fn quit_stops_backend_once() {
    let backend = RecordingBackend::new();

    let (reason, _) = run_script(&backend, "q\nx 10\n");

    assert_eq!(reason, ExitReason::Quit);
    assert!(backend.targets().is_empty());
    assert_eq!(backend.state().starts, 1);
    assert_eq!(backend.state().stops, 1);
}

#[test]
fn end_of_input_stops_backend_once() {
    let backend = RecordingBackend::new();

    let (reason, _) = run_script(&backend, "x 10\n");

    assert_eq!(reason, ExitReason::EndOfInput);
    assert_eq!(backend.targets(), vec![(X, 0.01)]);
    assert_eq!(backend.state().stops, 1);
}

#[test]
fn cancel_behaves_like_quit() {
    let backend = RecordingBackend::new();
    let cancel = CancelFlag::new();
    cancel.cancel();

    let (reason, _) = run_with(&backend, no_settle(), cancel, "x 10\n");

    assert_eq!(reason, ExitReason::Cancelled);
    assert!(backend.targets().is_empty());
    assert_eq!(backend.state().stops, 1);
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn output_failure_is_fatal_but_still_stops_backend() {
    let backend = RecordingBackend::new();
    let session = Session::open(backend.clone(), &axis_paths()).unwrap();
    let mut input = ReaderSource::new(Cursor::new("x 10\n"));

    let result =
        CommandInterpreter::new(session, no_settle(), BrokenPipe, CancelFlag::new()).run(&mut input);

    assert!(matches!(result, Err(ConsoleError::Io(_))));
    assert!(backend.targets().is_empty());
    assert_eq!(backend.state().stops, 1);
}
