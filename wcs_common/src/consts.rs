//! System-wide constants for the WCS workspace.
//!
//! Single source of truth for unit factors and defaults.

/// Millimeters per meter. Operator input is in mm, backends work in m.
pub const MM_PER_METER: f64 = 1000.0;

/// Default service name when no configuration file is given.
pub const DEFAULT_SERVICE_NAME: &str = "wcs-console";

/// Default backend driver name.
pub const DEFAULT_DRIVER: &str = "simulation";

/// Default upper bound for a single backend round trip, in milliseconds.
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 2000;

/// Default pause after a move so the next status read reflects it.
pub const DEFAULT_SETTLE_MS: u64 = 100;

/// Default simulation physics sub-step in microseconds (1 kHz).
pub const DEFAULT_STEP_US: u32 = 1000;
