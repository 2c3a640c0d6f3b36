//! Drivetrain state and the read-only snapshot handed to presenters.

use serde::{Deserialize, Serialize};

use crate::advisor::Advisory;
use crate::config::DrivetrainConfig;
use crate::error::{DrivetrainError, DrivetrainResult};

/// Mutable drivetrain record owned by the simulation driver.
///
/// Invariants, held after every operation:
/// - `1 <= gear <= top_gear`
/// - `rpm` and `target_rpm` inside the configured RPM range
#[derive(Debug, Clone, PartialEq)]
pub struct DrivetrainState {
    gear: usize,
    rpm: f64,
    target_rpm: f64,
    can_shift: bool,
}

impl DrivetrainState {
    /// Start-of-simulation state: first gear, idling, shift latch open.
    pub fn new(config: &DrivetrainConfig) -> Self {
        Self {
            gear: 1,
            rpm: config.min_rpm,
            target_rpm: config.min_rpm,
            can_shift: true,
        }
    }

    /// Build a state from explicit values, e.g. to start a scenario mid-run.
    ///
    /// # Errors
    ///
    /// Returns error if the gear or either RPM value breaks the invariants
    /// for `config`.
    pub fn with_values(
        config: &DrivetrainConfig,
        gear: usize,
        rpm: f64,
        target_rpm: f64,
    ) -> DrivetrainResult<Self> {
        if !(1..=config.top_gear()).contains(&gear) {
            return Err(DrivetrainError::InvalidState {
                what: format!("gear {gear} outside 1..={}", config.top_gear()),
            });
        }
        let range = config.rpm_range();
        for (what, value) in [("rpm", rpm), ("target_rpm", target_rpm)] {
            if !range.contains(value) {
                return Err(DrivetrainError::InvalidState {
                    what: format!("{what} {value} outside [{}, {}]", range.min, range.max),
                });
            }
        }
        Ok(Self {
            gear,
            rpm,
            target_rpm,
            can_shift: true,
        })
    }

    pub fn gear(&self) -> usize {
        self.gear
    }

    pub fn rpm(&self) -> f64 {
        self.rpm
    }

    pub fn target_rpm(&self) -> f64 {
        self.target_rpm
    }

    /// Debounce latch: true when a shift request would be honored.
    pub fn can_shift(&self) -> bool {
        self.can_shift
    }

    pub(crate) fn set_gear(&mut self, gear: usize) {
        self.gear = gear;
    }

    pub(crate) fn set_rpm(&mut self, rpm: f64) {
        self.rpm = rpm;
    }

    pub(crate) fn set_target_rpm(&mut self, target_rpm: f64) {
        self.target_rpm = target_rpm;
    }

    pub(crate) fn set_can_shift(&mut self, can_shift: bool) {
        self.can_shift = can_shift;
    }
}

/// Read-only view of the drivetrain after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Ticks completed so far.
    pub tick: u64,
    /// Accumulated elapsed time in seconds.
    pub time_s: f64,
    pub gear: usize,
    pub rpm: f64,
    pub target_rpm: f64,
    pub advisory: Advisory,
}
