//! Console session: backend, resolved axis handles and work offsets.
//!
//! A `Session` exists only between a successful `start_session` and the
//! matching `stop_session`. Opening resolves every axis before starting the
//! backend, so a scene missing a joint never starts motion. The backend is
//! stopped exactly once, by [`Session::close`] or on drop.

use crate::error::ConsoleError;
use crate::offsets::AxisOffsetStore;
use std::fmt::{self, Write as _};
use tracing::{debug, info, warn};
use wcs_common::axis::{Axis, AxisTable};
use wcs_common::consts::MM_PER_METER;
use wcs_common::hal::backend::{AxisHandle, BackendError, MotionBackend};

/// One status reading in millimeters.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    /// Work-frame position per axis (mm)
    pub work_mm: AxisTable<f64>,
    /// Machine-absolute position per axis (mm)
    pub machine_mm: AxisTable<f64>,
}

impl StatusLine {
    /// `X:50.0 Y:0.0 Z:0.0`, or `X:50.0 (abs 250.0) ...` with `show_absolute`.
    pub fn render(&self, show_absolute: bool) -> String {
        let mut out = String::new();
        for (axis, work) in self.work_mm.iter() {
            if axis != Axis::X {
                out.push(' ');
            }
            let _ = write!(out, "{}:{}", axis, format_mm(*work));
            if show_absolute {
                let _ = write!(out, " (abs {})", format_mm(self.machine_mm[axis]));
            }
        }
        out
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

/// One decimal place, without a `-0.0` for values that round to zero.
pub fn format_mm(mm: f64) -> String {
    let text = format!("{mm:.1}");
    if text == "-0.0" { "0.0".to_string() } else { text }
}

/// Result of a move: where the axis was sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveTarget {
    /// Axis that was moved
    pub axis: Axis,
    /// Requested work-frame position (mm)
    pub work_mm: f64,
    /// Set-point sent to the backend (m)
    pub machine_m: f64,
}

/// A running console session.
pub struct Session<B: MotionBackend> {
    backend: B,
    handles: AxisTable<AxisHandle>,
    offsets: AxisOffsetStore,
    active: bool,
}

impl<B: MotionBackend> Session<B> {
    /// Resolve every configured axis path, then start the backend session.
    ///
    /// # Errors
    /// `ConsoleError::BackendUnavailable` if a path cannot be resolved or the
    /// backend refuses to start. Both are fatal at startup.
    pub fn open(mut backend: B, axes: &AxisTable<String>) -> Result<Self, ConsoleError> {
        let handles = AxisTable::try_from_fn(|axis| {
            let handle = backend.resolve(&axes[axis])?;
            info!("Axis {} bound to {} ({})", axis, axes[axis], handle);
            Ok::<_, BackendError>(handle)
        })?;

        backend.start_session()?;
        info!("{} session started", backend.name());

        Ok(Self {
            backend,
            handles,
            offsets: AxisOffsetStore::new(),
            active: true,
        })
    }

    /// Send `axis` to `work_mm` in the current work frame.
    pub fn move_to(&mut self, axis: Axis, work_mm: f64) -> Result<MoveTarget, ConsoleError> {
        let machine_m = self.offsets.to_machine(axis, work_mm / MM_PER_METER);
        self.backend.set_target_position(self.handles[axis], machine_m)?;
        debug!("Axis {} -> {} mm work, {:.6} m machine", axis, work_mm, machine_m);
        Ok(MoveTarget {
            axis,
            work_mm,
            machine_m,
        })
    }

    /// Send every axis to machine-absolute zero. Offsets are not consulted.
    pub fn home(&mut self) -> Result<(), ConsoleError> {
        for axis in Axis::ALL {
            self.backend.set_target_position(self.handles[axis], 0.0)?;
        }
        info!("Homing all axes to machine zero");
        Ok(())
    }

    /// Capture the current absolute position of `axis` as its work zero.
    ///
    /// Returns the captured machine position (m).
    pub fn zero_axis(&mut self, axis: Axis) -> Result<f64, ConsoleError> {
        let position = self.backend.get_position(self.handles[axis])?;
        self.offsets.zero(axis, position);
        info!("Axis {} zeroed at {:.6} m", axis, position);
        Ok(position)
    }

    /// Zero X, Y and Z.
    ///
    /// All three positions are read before any offset changes, so a failed
    /// read leaves every offset as it was.
    pub fn zero_all(&mut self) -> Result<AxisTable<f64>, ConsoleError> {
        let positions =
            AxisTable::try_from_fn(|axis| self.backend.get_position(self.handles[axis]))?;
        for (axis, position) in positions.iter() {
            self.offsets.zero(axis, *position);
            info!("Axis {} zeroed at {:.6} m", axis, position);
        }
        Ok(positions)
    }

    /// Read every axis and express it in millimeters. Never mutates state.
    pub fn status(&mut self) -> Result<StatusLine, ConsoleError> {
        let machine_m =
            AxisTable::try_from_fn(|axis| self.backend.get_position(self.handles[axis]))?;
        Ok(StatusLine {
            work_mm: machine_m.map(|axis, m| self.offsets.to_work(axis, *m) * MM_PER_METER),
            machine_mm: machine_m.map(|_, m| m * MM_PER_METER),
        })
    }

    /// Stop the backend session.
    pub fn close(mut self) -> Result<(), ConsoleError> {
        self.shutdown().map_err(ConsoleError::from)
    }

    fn shutdown(&mut self) -> Result<(), BackendError> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.backend.stop_session()?;
        info!("{} session stopped", self.backend.name());
        Ok(())
    }

    /// Work offsets captured so far.
    pub fn offsets(&self) -> &AxisOffsetStore {
        &self.offsets
    }

    /// Backend handles resolved at open.
    pub fn handles(&self) -> &AxisTable<AxisHandle> {
        &self.handles
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: MotionBackend> Drop for Session<B> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Failed to stop backend session: {}", e);
        }
    }
}
