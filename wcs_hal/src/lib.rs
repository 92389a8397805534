//! # WCS HAL Library
//!
//! Motion backend implementations behind the `MotionBackend` trait defined
//! in `wcs_common::hal::backend`.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Backend factory registration
//! - [`drivers`] - Backend implementations (simulation)
//! - [`guard`] - Bounded-timeout wrapper running a backend on a worker thread
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  call + deadline   ┌──────────────────┐
//! │ wcs_console  │ ─────────────────► │  GuardedBackend  │
//! │  (Session)   │ ◄───────────────── │  (worker thread) │
//! └──────────────┘   reply/Timeout    └────────┬─────────┘
//!                                              │
//!                                              ▼
//!                                     ┌──────────────────┐
//!                                     │  MotionBackend   │ (trait object)
//!                                     │  e.g. simulation │
//!                                     └──────────────────┘
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod driver_registry;
pub mod drivers;
pub mod guard;

pub use crate::driver_registry::BackendRegistry;
pub use crate::guard::GuardedBackend;

use tracing::info;
use wcs_common::config::ConsoleConfig;
use wcs_common::hal::backend::{BackendError, MotionBackend};

/// Create the configured backend, initialize it and wrap it in a
/// [`GuardedBackend`] bounded by `backend.call_timeout_ms`.
///
/// # Errors
/// - `BackendError::BackendNotFound` if `backend.driver` is not registered
/// - Any error returned by the backend's `init()`
pub fn connect(
    registry: &BackendRegistry,
    config: &ConsoleConfig,
) -> Result<GuardedBackend, BackendError> {
    let mut backend = registry.create_backend(&config.backend.driver)?;
    info!("Created backend: {}", backend.name());

    backend.init(config)?;

    GuardedBackend::spawn(backend, config.backend.call_timeout())
}
