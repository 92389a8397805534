//! Joint physics simulator.
//!
//! The `JointSimulator` models one prismatic joint driven in position mode:
//! it accelerates toward its target under velocity and acceleration limits,
//! decelerates on a triangular profile, and never leaves its soft limits.

use std::time::Duration;
use tracing::{debug, trace};
use wcs_common::hal::config::JointConfig;

/// Velocity below which a joint counts as standing still (m/s).
const STANDSTILL_VELOCITY: f64 = 1e-6;

/// Joint simulator providing kinematic position control.
pub struct JointSimulator {
    /// Joint configuration
    config: JointConfig,
    /// Current position in meters
    position: f64,
    /// Current velocity in m/s
    velocity: f64,
    /// Target position (after soft-limit clamping)
    target_position: f64,
    /// Moving flag
    moving: bool,
}

impl JointSimulator {
    /// Create a joint at its configured initial position, at rest.
    pub fn new(config: JointConfig) -> Self {
        let position = config.initial_position;
        Self {
            config,
            position,
            velocity: 0.0,
            target_position: position,
            moving: false,
        }
    }

    /// Accept a new set-point. Targets beyond the soft limits are clamped.
    pub fn set_target(&mut self, target: f64) {
        let clamped = self.clamp_to_limits(target);
        if clamped != target {
            debug!(
                "Joint {}: target {:.4} clamped to soft limit {:.4}",
                self.config.path, target, clamped
            );
        }
        self.target_position = clamped;
    }

    /// Advance the joint by `dt`.
    pub fn update(&mut self, dt: Duration) {
        let dt = dt.as_secs_f64();
        if dt <= 0.0 {
            return;
        }

        let position_error = self.target_position - self.position;
        let max_vel = self.config.max_velocity;
        let max_acc = self.config.max_acceleration;

        // Settled: close enough and slow enough to stop within one step.
        if position_error.abs() <= self.config.in_position_window
            && self.velocity.abs() <= max_acc * dt
        {
            self.position = self.target_position;
            self.velocity = 0.0;
            self.moving = false;
            return;
        }

        // Triangular velocity profile
        let stopping_distance = self.velocity * self.velocity / (2.0 * max_acc);
        let desired_velocity = if position_error.abs() <= stopping_distance {
            position_error.signum() * (2.0 * max_acc * position_error.abs()).sqrt().min(max_vel)
        } else {
            position_error.signum() * max_vel
        };

        let max_vel_change = max_acc * dt;
        let vel_change = (desired_velocity - self.velocity).clamp(-max_vel_change, max_vel_change);
        self.velocity = (self.velocity + vel_change).clamp(-max_vel, max_vel);

        let step = self.velocity * dt;
        if step.signum() == position_error.signum() && step.abs() >= position_error.abs() {
            // Arrives within this step.
            self.position = self.target_position;
            self.velocity = 0.0;
        } else {
            self.position += step;
        }

        self.check_soft_limits();
        self.moving = self.velocity.abs() > STANDSTILL_VELOCITY;

        trace!(
            "Joint {}: pos={:.6}, vel={:.6}, target={:.6}",
            self.config.path,
            self.position,
            self.velocity,
            self.target_position
        );
    }

    /// Stop immediately and hold the current position.
    pub fn halt(&mut self) {
        self.velocity = 0.0;
        self.target_position = self.position;
        self.moving = false;
    }

    fn clamp_to_limits(&self, value: f64) -> f64 {
        let upper = self.config.soft_limit_positive.unwrap_or(f64::INFINITY);
        let lower = self.config.soft_limit_negative.unwrap_or(f64::NEG_INFINITY);
        value.clamp(lower, upper)
    }

    fn check_soft_limits(&mut self) {
        if let Some(limit_pos) = self.config.soft_limit_positive {
            if self.position > limit_pos {
                self.position = limit_pos;
                if self.velocity > 0.0 {
                    self.velocity = 0.0;
                }
            }
        }

        if let Some(limit_neg) = self.config.soft_limit_negative {
            if self.position < limit_neg {
                self.position = limit_neg;
                if self.velocity < 0.0 {
                    self.velocity = 0.0;
                }
            }
        }
    }

    /// Scene path of this joint.
    pub fn path(&self) -> &str {
        &self.config.path
    }

    /// Current position in meters.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Current velocity in m/s.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Active (clamped) target in meters.
    pub fn target(&self) -> f64 {
        self.target_position
    }

    /// Joint is moving.
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// At target position (within in_position_window).
    pub fn in_position(&self) -> bool {
        (self.target_position - self.position).abs() <= self.config.in_position_window
    }
}
