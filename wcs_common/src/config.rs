//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load TOML configuration files
//! and defines the console configuration.
//!
//! # Usage
//!
//! ```rust,no_run
//! use wcs_common::config::{load_config, ConfigError};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = load_config(Path::new("config/console.toml"))?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use crate::axis::AxisTable;
use crate::consts::{DEFAULT_SERVICE_NAME, DEFAULT_SETTLE_MS};
use crate::hal::config::{BackendConfig, SimulationConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Common configuration fields.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "wcs-console"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `service_name` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

/// Operator console behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleSettings {
    /// Pause after a move before the next status read, in milliseconds.
    /// Advisory only; it does not wait for the move to complete.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Also show machine-absolute positions in the status line.
    #[serde(default)]
    pub show_absolute: bool,
}

fn default_settle_ms() -> u64 {
    DEFAULT_SETTLE_MS
}

impl ConsoleSettings {
    /// Settle pause as a `Duration`.
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            show_absolute: false,
        }
    }
}

fn default_axis_paths() -> AxisTable<String> {
    AxisTable::new(
        "/axisX".to_string(),
        "/axisY".to_string(),
        "/axisZ".to_string(),
    )
}

/// Complete console configuration, usually loaded from `console.toml`.
///
/// Only `[shared]` is mandatory in the file; every other section falls back
/// to its defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Common fields.
    pub shared: SharedConfig,

    /// Backend selection and call policy.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Operator console behaviour.
    #[serde(default)]
    pub console: ConsoleSettings,

    /// Axis → scene path table, resolved once at startup.
    #[serde(default = "default_axis_paths")]
    pub axes: AxisTable<String>,

    /// Scene for the simulation backend.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl ConsoleConfig {
    /// Validate every section.
    ///
    /// # Validation Rules
    /// 1. `shared.service_name` not empty
    /// 2. `backend` section valid
    /// 3. Axis paths non-empty and distinct
    /// 4. `simulation` section valid
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.backend.validate()?;

        let mut paths = HashSet::new();
        for (axis, path) in self.axes.iter() {
            if path.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "Axis {} has empty scene path",
                    axis
                )));
            }
            if !paths.insert(path.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Axis {} reuses scene path {}",
                    axis, path
                )));
            }
        }

        self.simulation.validate()
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            backend: BackendConfig::default(),
            console: ConsoleSettings::default(),
            axes: default_axis_paths(),
            simulation: SimulationConfig::default(),
        }
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

/// Load and validate a console configuration file.
pub fn load_config(path: &Path) -> Result<ConsoleConfig, ConfigError> {
    let config = ConsoleConfig::load(path)?;
    config.validate()?;
    tracing::debug!(
        "Loaded config from {:?}: driver={}, axes={:?}",
        path,
        config.backend.driver,
        config.axes
    );
    Ok(config)
}
