//! Presentation seam.
//!
//! Presenters consume snapshots only; they never touch drivetrain state and
//! the core does not depend on them succeeding. [`GaugeReading`] carries the
//! derived values a tachometer and engine-sound adapter need.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::advisor::Advisory;
use crate::config::RpmRange;
use crate::state::Snapshot;

/// Lowest engine-sound playback rate.
pub const MIN_PLAYBACK_RATE: f64 = 0.5;

/// Start of the gauge sweep (radians, canvas convention).
pub const GAUGE_START_ANGLE: f64 = 0.75 * PI;
/// Total gauge sweep (radians).
pub const GAUGE_SWEEP: f64 = 1.5 * PI;

/// Receives drivetrain output after each tick.
pub trait Presenter {
    /// Called once per tick with the post-tick snapshot.
    fn present(&mut self, snapshot: &Snapshot);

    /// Called when the gear actually changes.
    fn on_gear_change(&mut self, _gear: usize) {}
}

/// Presenter that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _snapshot: &Snapshot) {}
}

/// Presenter that keeps everything it is shown.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    pub snapshots: Vec<Snapshot>,
    pub gear_changes: Vec<usize>,
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, snapshot: &Snapshot) {
        self.snapshots.push(*snapshot);
    }

    fn on_gear_change(&mut self, gear: usize) {
        self.gear_changes.push(gear);
    }
}

/// Display values derived from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeReading {
    /// Needle position in [0, 1] across the RPM range.
    pub needle_fraction: f64,
    /// Needle angle in radians.
    pub needle_angle: f64,
    /// Whole-number RPM readout.
    pub rpm_readout: u32,
    /// Engine-sound playback rate.
    pub playback_rate: f64,
    pub gear: usize,
    pub advisory: Advisory,
}

impl GaugeReading {
    pub fn from_snapshot(snapshot: &Snapshot, range: RpmRange) -> Self {
        let needle_fraction = ((snapshot.rpm - range.min) / range.span()).clamp(0.0, 1.0);
        Self {
            needle_fraction,
            needle_angle: GAUGE_START_ANGLE + needle_fraction * GAUGE_SWEEP,
            rpm_readout: snapshot.rpm.max(0.0).floor() as u32,
            playback_rate: (snapshot.rpm / range.max).max(MIN_PLAYBACK_RATE),
            gear: snapshot.gear,
            advisory: snapshot.advisory,
        }
    }

    /// Advisory text, if one should be shown.
    pub fn notification(&self) -> Option<&'static str> {
        self.advisory.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(rpm: f64, advisory: Advisory) -> Snapshot {
        Snapshot {
            tick: 1,
            time_s: 0.0,
            gear: 2,
            rpm,
            target_rpm: rpm,
            advisory,
        }
    }

    #[test]
    fn needle_spans_gauge() {
        let range = RpmRange::new(800.0, 7000.0);
        let idle = GaugeReading::from_snapshot(&snapshot(800.0, Advisory::None), range);
        assert_eq!(idle.needle_fraction, 0.0);
        assert!((idle.needle_angle - 0.75 * PI).abs() < 1e-12);

        let red = GaugeReading::from_snapshot(&snapshot(7000.0, Advisory::Upshift), range);
        assert_eq!(red.needle_fraction, 1.0);
        assert!((red.needle_angle - 2.25 * PI).abs() < 1e-12);
        assert_eq!(red.notification(), Some("Upshift Recommended"));
    }

    #[test]
    fn playback_rate_has_floor() {
        let range = RpmRange::new(800.0, 7000.0);
        let idle = GaugeReading::from_snapshot(&snapshot(800.0, Advisory::None), range);
        assert_eq!(idle.playback_rate, MIN_PLAYBACK_RATE);
        let high = GaugeReading::from_snapshot(&snapshot(5600.0, Advisory::None), range);
        assert!((high.playback_rate - 0.8).abs() < 1e-12);
    }

    #[test]
    fn readout_floors() {
        let range = RpmRange::new(800.0, 7000.0);
        let r = GaugeReading::from_snapshot(&snapshot(1234.99, Advisory::None), range);
        assert_eq!(r.rpm_readout, 1234);
        assert_eq!(r.notification(), None);
    }
}
