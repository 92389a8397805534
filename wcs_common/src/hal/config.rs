//! Backend configuration types.
//!
//! This module contains configuration types for motion backends:
//! - `BackendConfig` - Which backend to load and how long a call may take
//! - `SimulationConfig` - Scene description for the simulation backend
//! - `JointConfig` - Per-joint kinematics of the simulated scene

use crate::config::ConfigError;
use crate::consts::{DEFAULT_CALL_TIMEOUT_MS, DEFAULT_DRIVER, DEFAULT_STEP_US};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

fn default_driver() -> String {
    DEFAULT_DRIVER.to_string()
}

fn default_call_timeout_ms() -> u64 {
    DEFAULT_CALL_TIMEOUT_MS
}

fn default_step_us() -> u32 {
    DEFAULT_STEP_US
}

fn default_max_velocity() -> f64 {
    0.1
}

fn default_max_acceleration() -> f64 {
    1.0
}

fn default_in_position_window() -> f64 {
    1e-5
}

/// Backend selection and call policy.
///
/// # TOML Example
///
/// ```toml
/// [backend]
/// driver = "simulation"
/// call_timeout_ms = 2000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Registered backend name.
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Upper bound for one backend round trip, in milliseconds.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

impl BackendConfig {
    /// Call deadline as a `Duration`.
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Validate the backend section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.driver.is_empty() {
            return Err(ConfigError::ValidationError(
                "backend.driver cannot be empty".to_string(),
            ));
        }
        if self.call_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "backend.call_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

/// Scene description for the simulation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Physics sub-step in microseconds.
    #[serde(default = "default_step_us")]
    pub step_us: u32,

    /// Joints present in the scene.
    #[serde(default = "default_joints")]
    pub joints: Vec<JointConfig>,
}

impl SimulationConfig {
    /// Physics sub-step as a `Duration`.
    pub fn step(&self) -> Duration {
        Duration::from_micros(self.step_us as u64)
    }

    /// Validate the scene.
    ///
    /// # Validation Rules
    /// 1. `step_us` > 0
    /// 2. Joint paths non-empty and unique
    /// 3. Every joint passes [`JointConfig::validate`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step_us == 0 {
            return Err(ConfigError::ValidationError(
                "simulation.step_us must be greater than 0".to_string(),
            ));
        }

        let mut paths = HashSet::new();
        for joint in &self.joints {
            joint.validate()?;
            if !paths.insert(joint.path.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate joint path: {}",
                    joint.path
                )));
            }
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step_us: default_step_us(),
            joints: default_joints(),
        }
    }
}

/// Default scene: one prismatic joint per stage axis.
fn default_joints() -> Vec<JointConfig> {
    ["/axisX", "/axisY", "/axisZ"]
        .into_iter()
        .map(JointConfig::new)
        .collect()
}

/// Kinematics of one simulated prismatic joint. Units are meters and seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JointConfig {
    /// Scene path used for name resolution (e.g. "/axisX").
    pub path: String,

    /// Position at scene load.
    #[serde(default)]
    pub initial_position: f64,

    /// Maximum velocity in m/s.
    #[serde(default = "default_max_velocity")]
    pub max_velocity: f64,

    /// Maximum acceleration in m/s².
    #[serde(default = "default_max_acceleration")]
    pub max_acceleration: f64,

    /// Joint is "in position" when |actual - target| <= in_position_window.
    #[serde(default = "default_in_position_window")]
    pub in_position_window: f64,

    /// Software limits
    #[serde(default)]
    pub soft_limit_positive: Option<f64>,
    #[serde(default)]
    pub soft_limit_negative: Option<f64>,
}

impl JointConfig {
    /// Joint with default kinematics and no soft limits.
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            initial_position: 0.0,
            max_velocity: default_max_velocity(),
            max_acceleration: default_max_acceleration(),
            in_position_window: default_in_position_window(),
            soft_limit_positive: None,
            soft_limit_negative: None,
        }
    }

    /// Validate the joint configuration.
    ///
    /// # Validation Rules
    /// 1. `path` not empty
    /// 2. `max_velocity` and `max_acceleration` > 0
    /// 3. `in_position_window` >= 0
    /// 4. `soft_limit_negative` < `soft_limit_positive` (if both set)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.is_empty() {
            return Err(ConfigError::ValidationError(
                "Joint has empty path".to_string(),
            ));
        }
        if self.max_velocity <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "Joint '{}': max_velocity must be > 0",
                self.path
            )));
        }
        if self.max_acceleration <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "Joint '{}': max_acceleration must be > 0",
                self.path
            )));
        }
        if self.in_position_window < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "Joint '{}': in_position_window must be >= 0",
                self.path
            )));
        }
        if let (Some(neg), Some(pos)) = (self.soft_limit_negative, self.soft_limit_positive) {
            if neg >= pos {
                return Err(ConfigError::ValidationError(format!(
                    "Joint '{}': soft_limit_negative ({}) must be < soft_limit_positive ({})",
                    self.path, neg, pos
                )));
            }
        }
        Ok(())
    }
}
