//! Motion backend implementations.
//!
//! - [`simulation`] - In-process physics scene for development and testing
//!
//! # Adding New Backends
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `MotionBackend` trait from `wcs_common::hal::backend`
//! 3. Register it in [`register_all_backends`]

pub mod simulation;

use crate::driver_registry::BackendRegistry;

/// Register all built-in backends.
pub fn register_all_backends(registry: &mut BackendRegistry) {
    registry.register("simulation", simulation::create_backend);
}
