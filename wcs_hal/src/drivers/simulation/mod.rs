//! Simulation backend module.
//!
//! A scene of named prismatic joints with kinematic physics, standing in for
//! the physical stage during development and testing.

mod backend;
mod physics;

pub use backend::SimulationBackend;
pub use physics::JointSimulator;

use wcs_common::hal::backend::MotionBackend;

/// Factory function to create a simulation backend instance.
pub fn create_backend() -> Box<dyn MotionBackend> {
    Box::new(SimulationBackend::new())
}
