//! Throttle-driven target RPM.
//!
//! The target RPM is an accumulator carried across ticks: each tick on
//! throttle adds `ratio * accel_gain`, each tick off throttle removes
//! `ratio * decel_gain`. Deceleration is the faster of the two with the
//! reference gains, giving an engine-braking feel.

use crate::config::{DrivetrainConfig, GearTable, RpmRange};
use crate::state::DrivetrainState;

/// Computes the next target RPM from the throttle signal and current gear.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrottleModel {
    accel_gain: f64,
    decel_gain: f64,
    gears: GearTable,
    range: RpmRange,
}

impl ThrottleModel {
    pub fn new(accel_gain: f64, decel_gain: f64, gears: GearTable, range: RpmRange) -> Self {
        Self {
            accel_gain,
            decel_gain,
            gears,
            range,
        }
    }

    pub fn from_config(config: &DrivetrainConfig) -> Self {
        Self::new(
            config.accel_gain,
            config.decel_gain,
            config.gears.clone(),
            config.rpm_range(),
        )
    }

    /// Next target RPM, saturated into the RPM range.
    pub fn compute_target_rpm(
        &self,
        throttle_engaged: bool,
        gear: usize,
        current_target: f64,
    ) -> f64 {
        let ratio = self.gears.profile(gear).ratio;
        let next = if throttle_engaged {
            current_target + ratio * self.accel_gain
        } else {
            current_target - ratio * self.decel_gain
        };
        self.range.clamp(next)
    }

    /// Update the target RPM carried in `state`.
    pub fn apply(&self, throttle_engaged: bool, state: &mut DrivetrainState) {
        let target = self.compute_target_rpm(throttle_engaged, state.gear(), state.target_rpm());
        state.set_target_rpm(target);
    }
}
