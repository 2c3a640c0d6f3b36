//! Shift-axis handling with wall-clock debounce.
//!
//! A shift axis sample at or beyond the threshold triggers a shift: pushing
//! forward (negative) requests an upshift, pulling back (positive) a
//! downshift. Every trigger closes the `can_shift` latch for the debounce
//! interval, even when the gear is already at its limit.
//!
//! The debounce is a countdown advanced by measured elapsed time at the start
//! of each tick rather than a background timer, so it can never race the
//! tick.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DrivetrainConfig;
use crate::state::DrivetrainState;

/// Direction of a requested shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftDirection {
    Up,
    Down,
}

/// What a shift-axis sample did to the drivetrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftOutcome {
    /// Axis inside the dead zone; nothing requested.
    None,
    /// Axis outside [-1, 1] (or NaN); ignored.
    OutOfRange,
    /// Trigger arrived while the latch was closed; ignored.
    Debounced,
    /// Gear changed.
    Shifted {
        from: usize,
        to: usize,
        direction: ShiftDirection,
    },
    /// Trigger accepted but the gear was already at its limit.
    Saturated {
        gear: usize,
        direction: ShiftDirection,
    },
}

impl ShiftOutcome {
    /// New gear, if this outcome changed it.
    pub fn new_gear(&self) -> Option<usize> {
        match self {
            Self::Shifted { to, .. } => Some(*to),
            _ => None,
        }
    }

    /// True if the sample started a debounce window.
    pub fn triggered(&self) -> bool {
        matches!(self, Self::Shifted { .. } | Self::Saturated { .. })
    }
}

/// Countdown that reopens the shift latch once the debounce interval has
/// elapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct DebounceTimer {
    interval: Duration,
    remaining: Option<Duration>,
}

impl DebounceTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            remaining: None,
        }
    }

    /// Start (or restart) the countdown.
    pub fn arm(&mut self) {
        self.remaining = Some(self.interval);
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Time left before the latch reopens; zero when not armed.
    pub fn remaining(&self) -> Duration {
        self.remaining.unwrap_or_default()
    }

    /// Count down by `elapsed`.
    ///
    /// Returns `true` if the countdown expired during this call.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        match self.remaining {
            Some(left) => {
                let left = left.saturating_sub(elapsed);
                if left.is_zero() {
                    self.remaining = None;
                    true
                } else {
                    self.remaining = Some(left);
                    false
                }
            }
            None => false,
        }
    }
}

/// Consumes shift-axis samples and mutates the gear.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftController {
    threshold: f64,
    top_gear: usize,
    debounce: DebounceTimer,
}

impl ShiftController {
    pub fn new(threshold: f64, top_gear: usize, debounce: Duration) -> Self {
        Self {
            threshold,
            top_gear,
            debounce: DebounceTimer::new(debounce),
        }
    }

    pub fn from_config(config: &DrivetrainConfig) -> Self {
        Self::new(
            config.shift_threshold,
            config.top_gear(),
            Duration::from_millis(config.debounce_ms),
        )
    }

    pub fn debounce(&self) -> &DebounceTimer {
        &self.debounce
    }

    /// Close the latch window as if a shift had just been accepted.
    pub(crate) fn hold_latch(&mut self) {
        self.debounce.arm();
    }

    /// Advance the debounce countdown by the wall-clock time since the last
    /// tick, reopening the latch when it expires.
    pub fn advance_clock(&mut self, elapsed: Duration, state: &mut DrivetrainState) {
        if self.debounce.advance(elapsed) {
            state.set_can_shift(true);
            debug!(gear = state.gear(), "shift latch reopened");
        }
    }

    /// Apply one shift-axis sample.
    pub fn handle_shift_input(&mut self, axis: f64, state: &mut DrivetrainState) -> ShiftOutcome {
        if !(-1.0..=1.0).contains(&axis) {
            return ShiftOutcome::OutOfRange;
        }

        let direction = if axis <= -self.threshold {
            ShiftDirection::Up
        } else if axis >= self.threshold {
            ShiftDirection::Down
        } else {
            return ShiftOutcome::None;
        };

        if !state.can_shift() {
            return ShiftOutcome::Debounced;
        }

        state.set_can_shift(false);
        self.debounce.arm();

        let from = state.gear();
        let to = match direction {
            ShiftDirection::Up if from < self.top_gear => from + 1,
            ShiftDirection::Down if from > 1 => from - 1,
            _ => {
                debug!(gear = from, ?direction, "shift request at gear limit");
                return ShiftOutcome::Saturated {
                    gear: from,
                    direction,
                };
            }
        };

        state.set_gear(to);
        debug!(from, to, ?direction, "shifted");
        ShiftOutcome::Shifted {
            from,
            to,
            direction,
        }
    }
}
