//! Session lifecycle: startup resolution, bracketing and teardown.

use super::backend::{RecordingBackend, axis_paths};
use wcs_common::axis::{Axis, AxisTable};
use wcs_common::hal::backend::{AxisHandle, BackendError};
use wcs_console::{ConsoleError, Session};

#[test]
fn open_resolves_every_axis_then_starts() {
    let backend = RecordingBackend::with_paths(&["/axisZ", "/axisY", "/axisX"]);

    let session = Session::open(backend.clone(), &axis_paths()).unwrap();

    assert_eq!(
        *session.handles(),
        AxisTable::new(AxisHandle::new(2), AxisHandle::new(1), AxisHandle::new(0))
    );
    assert_eq!(backend.state().starts, 1);
    assert_eq!(backend.state().stops, 0);
}

#[test]
fn missing_joint_is_fatal_and_never_starts() {
    let backend = RecordingBackend::with_paths(&["/axisX", "/axisY", "/JuntaZ"]);

    let result = Session::open(backend.clone(), &axis_paths());

    assert!(matches!(
        result,
        Err(ConsoleError::BackendUnavailable(BackendError::AxisNotFound(ref path))) if path == "/axisZ"
    ));
    assert_eq!(backend.state().starts, 0);
    assert_eq!(backend.state().stops, 0);
}

#[test]
fn close_stops_once() {
    let backend = RecordingBackend::new();
    let session = Session::open(backend.clone(), &axis_paths()).unwrap();

    session.close().unwrap();

    assert_eq!(backend.state().stops, 1);
}

#[test]
fn drop_stops_once() {
    let backend = RecordingBackend::new();
    {
        let _session = Session::open(backend.clone(), &axis_paths()).unwrap();
    }
    assert_eq!(backend.state().stops, 1);
}

#[test]
fn offsets_start_at_zero() {
    let backend = RecordingBackend::new();
    backend.set_position(Axis::Y, 0.3);
    let mut session = Session::open(backend, &axis_paths()).unwrap();

    assert_eq!(*session.offsets().offsets(), AxisTable::new(0.0, 0.0, 0.0));
    let status = session.status().unwrap();
    assert_eq!(status.work_mm, status.machine_mm);
    assert_eq!(status.to_string(), "X:0.0 Y:300.0 Z:0.0");
}

#[test]
fn status_is_read_only() {
    let backend = RecordingBackend::new();
    backend.set_position(Axis::X, 0.2);
    let mut session = Session::open(backend.clone(), &axis_paths()).unwrap();
    session.zero_axis(Axis::X).unwrap();
    let offsets = session.offsets().clone();

    for _ in 0..3 {
        session.status().unwrap();
    }

    assert_eq!(session.offsets(), &offsets);
    assert!(backend.targets().is_empty());
}

#[test]
fn rezero_is_idempotent() {
    let backend = RecordingBackend::new();
    backend.set_position(Axis::Z, -0.05);
    let mut session = Session::open(backend, &axis_paths()).unwrap();

    assert_eq!(session.zero_axis(Axis::Z).unwrap(), -0.05);
    assert_eq!(session.zero_axis(Axis::Z).unwrap(), -0.05);
    assert_eq!(session.offsets().offset(Axis::Z), -0.05);
    assert_eq!(session.offsets().offset(Axis::X), 0.0);
}

#[test]
fn move_reports_sent_set_point() {
    let backend = RecordingBackend::new();
    backend.set_position(Axis::Y, 0.1);
    let mut session = Session::open(backend.clone(), &axis_paths()).unwrap();
    session.zero_axis(Axis::Y).unwrap();

    let target = session.move_to(Axis::Y, -20.0).unwrap();

    assert_eq!(target.axis, Axis::Y);
    assert_eq!(target.work_mm, -20.0);
    assert!((target.machine_m - 0.08).abs() < 1e-12);
    assert_eq!(backend.targets(), vec![(AxisHandle::new(1), target.machine_m)]);
}
