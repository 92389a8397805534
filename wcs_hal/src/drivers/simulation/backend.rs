//! Simulation backend implementation.
//!
//! The `SimulationBackend` implements the `MotionBackend` trait on top of a
//! scene of [`JointSimulator`]s. Physics only advance while a session is
//! running. In realtime mode every backend call first catches the scene up
//! to wall-clock time in fixed sub-steps; in manual mode the owner drives
//! time explicitly through [`SimulationBackend::step`].

use super::physics::JointSimulator;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};
use wcs_common::config::ConsoleConfig;
use wcs_common::consts::DEFAULT_STEP_US;
use wcs_common::hal::backend::{AxisHandle, BackendError, MotionBackend};
use wcs_common::hal::config::SimulationConfig;

/// Longest stretch of wall-clock time simulated in one catch-up.
const MAX_CATCH_UP: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clock {
    Realtime,
    Manual,
}

/// Simulation backend implementing the MotionBackend trait.
pub struct SimulationBackend {
    /// Joint simulators, indexed by handle
    joints: Vec<JointSimulator>,
    /// Physics sub-step
    step: Duration,
    /// Simulated time not yet consumed by a full sub-step
    pending: Duration,
    /// Time source
    clock: Clock,
    /// Wall-clock instant of the last catch-up (realtime mode)
    last_sync: Option<Instant>,
    /// Physics running
    running: bool,
    /// Sub-steps executed since scene load
    step_count: u64,
}

impl SimulationBackend {
    /// Create a realtime simulation backend with an empty scene.
    pub fn new() -> Self {
        Self {
            joints: Vec::new(),
            step: Duration::from_micros(DEFAULT_STEP_US as u64),
            pending: Duration::ZERO,
            clock: Clock::Realtime,
            last_sync: None,
            running: false,
            step_count: 0,
        }
    }

    /// Create a backend whose time only advances through [`Self::step`].
    pub fn with_manual_clock() -> Self {
        Self {
            clock: Clock::Manual,
            ..Self::new()
        }
    }

    /// Replace the scene with the configured joints, all at rest.
    pub fn load_scene(&mut self, config: &SimulationConfig) {
        self.joints = config
            .joints
            .iter()
            .map(|joint| JointSimulator::new(joint.clone()))
            .collect();
        self.step = config.step();
        self.pending = Duration::ZERO;
        self.step_count = 0;
        info!(
            "Loaded simulation scene: {} joints, step={:?}",
            self.joints.len(),
            self.step
        );
    }

    /// Advance physics by `elapsed` of simulated time.
    ///
    /// Has no effect while the session is stopped.
    pub fn step(&mut self, elapsed: Duration) {
        if !self.running {
            return;
        }

        let elapsed = if elapsed > MAX_CATCH_UP {
            warn!(
                "Simulation fell {:?} behind, simulating the last {:?} only",
                elapsed, MAX_CATCH_UP
            );
            MAX_CATCH_UP
        } else {
            elapsed
        };

        self.pending += elapsed;
        let mut steps = 0u64;
        while self.pending >= self.step {
            self.pending -= self.step;
            for joint in &mut self.joints {
                joint.update(self.step);
            }
            steps += 1;
        }
        self.step_count += steps;
        trace!("Simulated {} sub-steps ({} total)", steps, self.step_count);
    }

    /// Catch up to wall-clock time (realtime mode only).
    fn sync_clock(&mut self) {
        if self.clock != Clock::Realtime {
            return;
        }
        let now = Instant::now();
        if let Some(last) = self.last_sync.replace(now) {
            self.step(now.duration_since(last));
        }
    }

    fn joint(&self, handle: AxisHandle) -> Result<&JointSimulator, BackendError> {
        self.joints
            .get(handle.raw() as usize)
            .ok_or(BackendError::InvalidHandle(handle))
    }

    fn joint_mut(&mut self, handle: AxisHandle) -> Result<&mut JointSimulator, BackendError> {
        self.joints
            .get_mut(handle.raw() as usize)
            .ok_or(BackendError::InvalidHandle(handle))
    }

    /// Physics running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Sub-steps executed since scene load.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Active target of a joint, after soft-limit clamping.
    pub fn target_of(&self, handle: AxisHandle) -> Result<f64, BackendError> {
        Ok(self.joint(handle)?.target())
    }
}

impl Default for SimulationBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionBackend for SimulationBackend {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn init(&mut self, config: &ConsoleConfig) -> Result<(), BackendError> {
        self.load_scene(&config.simulation);
        Ok(())
    }

    fn resolve(&mut self, path: &str) -> Result<AxisHandle, BackendError> {
        let index = self
            .joints
            .iter()
            .position(|joint| joint.path() == path)
            .ok_or_else(|| BackendError::AxisNotFound(path.to_string()))?;
        let handle = AxisHandle::new(index as u32);
        debug!("Resolved {} -> {}", path, handle);
        Ok(handle)
    }

    fn get_position(&mut self, handle: AxisHandle) -> Result<f64, BackendError> {
        self.sync_clock();
        Ok(self.joint(handle)?.position())
    }

    fn set_target_position(&mut self, handle: AxisHandle, value: f64) -> Result<(), BackendError> {
        self.sync_clock();
        let joint = self.joint_mut(handle)?;
        joint.set_target(value);
        debug!("Joint {} target {:.6} m", joint.path(), joint.target());
        Ok(())
    }

    fn start_session(&mut self) -> Result<(), BackendError> {
        if self.running {
            warn!("Simulation already running");
            return Ok(());
        }
        self.running = true;
        self.pending = Duration::ZERO;
        self.last_sync = Some(Instant::now());
        info!("Simulation started");
        Ok(())
    }

    fn stop_session(&mut self) -> Result<(), BackendError> {
        if !self.running {
            debug!("Simulation already stopped");
            return Ok(());
        }
        self.sync_clock();
        for joint in &mut self.joints {
            joint.halt();
        }
        self.running = false;
        self.last_sync = None;
        info!("Simulation stopped after {} sub-steps", self.step_count);
        Ok(())
    }
}
