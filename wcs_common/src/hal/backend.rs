//! Motion backend trait and error types.
//!
//! This module defines:
//! - `MotionBackend` trait - Interface for pluggable motion backends
//! - `BackendError` enum - Error types for backend operations
//! - `AxisHandle` - Opaque backend-issued reference to a named joint
//! - `BackendFactory` type alias - Factory function type

use crate::config::ConsoleConfig;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Opaque reference to a backend joint, obtained once by name resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisHandle(u32);

impl AxisHandle {
    /// Wrap a backend-specific raw handle value.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw handle value, meaningful only to the backend that issued it.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AxisHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Error types for backend operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    /// Scene path could not be resolved to a joint
    #[error("Axis not found: {0}")]
    AxisNotFound(String),

    /// Handle was not issued by this backend
    #[error("Invalid handle: {0}")]
    InvalidHandle(AxisHandle),

    /// Backend communication error
    #[error("Backend communication error: {0}")]
    CommunicationError(String),

    /// Round trip exceeded its deadline
    #[error("Backend call timed out after {0:?}")]
    Timeout(Duration),

    /// Backend initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// No backend registered under this name
    #[error("Backend not found: {0}")]
    BackendNotFound(String),
}

/// Factory function type for creating backend instances.
pub type BackendFactory = fn() -> Box<dyn MotionBackend>;

/// Trait defining the interface for motion backends.
///
/// The console drives a backend through this trait, so the simulation
/// backend and any future hardware backend are interchangeable.
///
/// # Lifecycle
///
/// 1. `init()` - Called once with the loaded configuration
/// 2. `resolve()` - Called once per axis before the session starts
/// 3. `start_session()` - Called once when the control loop is entered
/// 4. `get_position()` / `set_target_position()` - Any number of times
/// 5. `stop_session()` - Called once when the control loop exits, also on
///    abnormal exit
///
/// All positions are machine-absolute, in meters.
pub trait MotionBackend: Send {
    /// Returns the backend's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Initialize the backend with the console configuration.
    ///
    /// Default implementation does nothing.
    fn init(&mut self, _config: &ConsoleConfig) -> Result<(), BackendError> {
        Ok(())
    }

    /// Map a configured scene path to a handle.
    ///
    /// # Errors
    /// Return `BackendError::AxisNotFound` if no joint has this path.
    fn resolve(&mut self, path: &str) -> Result<AxisHandle, BackendError>;

    /// Current machine-absolute position in meters.
    fn get_position(&mut self, handle: AxisHandle) -> Result<f64, BackendError>;

    /// Command the joint toward an absolute position in meters.
    ///
    /// Fire-and-forget: returns once the set-point is accepted, not when
    /// the joint arrives.
    fn set_target_position(&mut self, handle: AxisHandle, value: f64) -> Result<(), BackendError>;

    /// Start the simulated physics / control session.
    fn start_session(&mut self) -> Result<(), BackendError>;

    /// Stop the session and release backend resources.
    fn stop_session(&mut self) -> Result<(), BackendError>;
}

impl<B: MotionBackend + ?Sized> MotionBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn init(&mut self, config: &ConsoleConfig) -> Result<(), BackendError> {
        (**self).init(config)
    }

    fn resolve(&mut self, path: &str) -> Result<AxisHandle, BackendError> {
        (**self).resolve(path)
    }

    fn get_position(&mut self, handle: AxisHandle) -> Result<f64, BackendError> {
        (**self).get_position(handle)
    }

    fn set_target_position(&mut self, handle: AxisHandle, value: f64) -> Result<(), BackendError> {
        (**self).set_target_position(handle, value)
    }

    fn start_session(&mut self) -> Result<(), BackendError> {
        (**self).start_session()
    }

    fn stop_session(&mut self) -> Result<(), BackendError> {
        (**self).stop_session()
    }
}
