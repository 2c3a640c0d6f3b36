//! Shift-point advisory.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{DrivetrainConfig, GearTable};
use crate::state::DrivetrainState;

/// Recommendation derived from the current RPM and gear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Advisory {
    Upshift,
    Downshift,
    #[default]
    None,
}

impl Advisory {
    /// Text shown by a presenter, if any.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::Upshift => Some("Upshift Recommended"),
            Self::Downshift => Some("Downshift Recommended"),
            Self::None => None,
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upshift => write!(f, "upshift"),
            Self::Downshift => write!(f, "downshift"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Pure advisory over the gear table.
///
/// Upshift when `rpm >= optimal` and not in top gear; downshift when
/// `rpm <= optimal - margin` and not in first; otherwise none.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftAdvisor {
    gears: GearTable,
    downshift_margin: f64,
}

impl ShiftAdvisor {
    pub fn new(gears: GearTable, downshift_margin: f64) -> Self {
        Self {
            gears,
            downshift_margin,
        }
    }

    pub fn from_config(config: &DrivetrainConfig) -> Self {
        Self::new(config.gears.clone(), config.downshift_margin_rpm)
    }

    /// Advisory for an explicit gear and RPM.
    pub fn advise(&self, gear: usize, rpm: f64) -> Advisory {
        let optimal = self.gears.profile(gear).optimal_shift_rpm;
        if rpm >= optimal && gear < self.gears.top_gear() {
            Advisory::Upshift
        } else if rpm <= optimal - self.downshift_margin && gear > 1 {
            Advisory::Downshift
        } else {
            Advisory::None
        }
    }

    pub fn evaluate(&self, state: &DrivetrainState) -> Advisory {
        self.advise(state.gear(), state.rpm())
    }
}
