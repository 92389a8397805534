//! Work coordinate offsets.
//!
//! For each axis the store holds the machine-absolute position (meters) that
//! corresponds to work-coordinate zero:
//!
//! ```text
//! machine = work + offset
//! work    = machine - offset
//! ```
//!
//! The store knows nothing about millimeters, text or backends. Offsets
//! change only through [`AxisOffsetStore::zero`].

use wcs_common::axis::{Axis, AxisTable};

/// Per-axis work-zero offsets in meters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisOffsetStore {
    offsets: AxisTable<f64>,
}

impl AxisOffsetStore {
    /// All offsets at 0.0: work frame equals machine frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `machine_position` the work zero of `axis`.
    ///
    /// Any value is accepted; travel limits are the backend's concern.
    pub fn zero(&mut self, axis: Axis, machine_position: f64) {
        self.offsets[axis] = machine_position;
    }

    /// Work position → machine-absolute position.
    pub fn to_machine(&self, axis: Axis, work_position: f64) -> f64 {
        work_position + self.offsets[axis]
    }

    /// Machine-absolute position → work position.
    pub fn to_work(&self, axis: Axis, machine_position: f64) -> f64 {
        machine_position - self.offsets[axis]
    }

    /// Current offset of one axis.
    pub fn offset(&self, axis: Axis) -> f64 {
        self.offsets[axis]
    }

    /// All offsets.
    pub fn offsets(&self) -> &AxisTable<f64> {
        &self.offsets
    }
}
