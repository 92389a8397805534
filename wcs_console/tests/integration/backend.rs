//! Recording motion backend.
//!
//! Targets take effect instantly, so a status read right after a move sees
//! the commanded position. Every call is recorded in shared state that the
//! test keeps a handle to after the backend moves into a session.

use std::sync::{Arc, Mutex, MutexGuard};
use wcs_common::axis::{Axis, AxisTable};
use wcs_common::hal::backend::{AxisHandle, BackendError, MotionBackend};

#[derive(Debug, Default)]
pub struct Recorded {
    /// Machine position per handle (m)
    pub positions: [f64; 3],
    /// Every set-point received, in order
    pub targets: Vec<(AxisHandle, f64)>,
    pub starts: usize,
    pub stops: usize,
    /// Handles whose reads fail
    pub unreadable: Vec<AxisHandle>,
    /// Error returned by every `set_target_position`
    pub write_error: Option<BackendError>,
}

#[derive(Clone)]
pub struct RecordingBackend {
    state: Arc<Mutex<Recorded>>,
    paths: Vec<String>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::with_paths(&["/axisX", "/axisY", "/axisZ"])
    }

    pub fn with_paths(paths: &[&str]) -> Self {
        Self {
            state: Arc::new(Mutex::new(Recorded::default())),
            paths: paths.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, Recorded> {
        self.state.lock().unwrap()
    }

    pub fn set_position(&self, axis: Axis, meters: f64) {
        self.state().positions[axis as usize] = meters;
    }

    pub fn fail_reads(&self) {
        self.state().unreadable = (0..3).map(AxisHandle::new).collect();
    }

    pub fn targets(&self) -> Vec<(AxisHandle, f64)> {
        self.state().targets.clone()
    }
}

impl MotionBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn resolve(&mut self, path: &str) -> Result<AxisHandle, BackendError> {
        self.paths
            .iter()
            .position(|p| p == path)
            .map(|i| AxisHandle::new(i as u32))
            .ok_or_else(|| BackendError::AxisNotFound(path.to_string()))
    }

    fn get_position(&mut self, handle: AxisHandle) -> Result<f64, BackendError> {
        let state = self.state();
        if state.unreadable.contains(&handle) {
            return Err(BackendError::CommunicationError("read refused".to_string()));
        }
        state
            .positions
            .get(handle.raw() as usize)
            .copied()
            .ok_or(BackendError::InvalidHandle(handle))
    }

    fn set_target_position(&mut self, handle: AxisHandle, value: f64) -> Result<(), BackendError> {
        let mut state = self.state();
        if let Some(err) = &state.write_error {
            return Err(err.clone());
        }
        let slot = state
            .positions
            .get_mut(handle.raw() as usize)
            .ok_or(BackendError::InvalidHandle(handle))?;
        *slot = value;
        state.targets.push((handle, value));
        Ok(())
    }

    fn start_session(&mut self) -> Result<(), BackendError> {
        self.state().starts += 1;
        Ok(())
    }

    fn stop_session(&mut self) -> Result<(), BackendError> {
        self.state().stops += 1;
        Ok(())
    }
}

pub fn axis_paths() -> AxisTable<String> {
    AxisTable::new(
        "/axisX".to_string(),
        "/axisY".to_string(),
        "/axisZ".to_string(),
    )
}
