//! First-order RPM smoothing toward the target.

use crate::config::{DrivetrainConfig, RpmRange};
use crate::state::DrivetrainState;

/// Moves RPM toward target RPM by a fixed fraction of the remaining error
/// each tick.
///
/// `rpm += (target - rpm) * damping`, then clamped. After `k` ticks at a
/// constant target the remaining error is `e0 * (1 - damping)^k`; the RPM
/// approaches the target asymptotically and no settled state is declared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RpmIntegrator {
    damping: f64,
    range: RpmRange,
}

impl RpmIntegrator {
    pub fn new(damping: f64, range: RpmRange) -> Self {
        Self { damping, range }
    }

    pub fn from_config(config: &DrivetrainConfig) -> Self {
        Self::new(config.damping_factor, config.rpm_range())
    }

    /// RPM after one tick from `rpm` toward `target`.
    pub fn next_rpm(&self, rpm: f64, target: f64) -> f64 {
        let delta = target - rpm;
        self.range.clamp(rpm + delta * self.damping)
    }

    /// Advance `state.rpm` by one tick. Call exactly once per tick.
    pub fn step(&self, state: &mut DrivetrainState) {
        let rpm = self.next_rpm(state.rpm(), state.target_rpm());
        state.set_rpm(rpm);
    }
}
