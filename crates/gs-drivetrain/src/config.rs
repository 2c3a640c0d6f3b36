//! Drivetrain configuration: RPM bounds, per-gear profiles and tuning gains.
//!
//! The configuration is fixed once a [`Drivetrain`](crate::Drivetrain) is
//! built. Every field has a reference default, so a config file only needs
//! to name the values it changes.

use std::path::Path;

use gs_core::{ensure_finite, ensure_positive, ensure_within};
use serde::{Deserialize, Serialize};

use crate::error::{DrivetrainError, DrivetrainResult};

/// Reference idle RPM.
pub const DEFAULT_MIN_RPM: f64 = 800.0;
/// Reference redline RPM.
pub const DEFAULT_MAX_RPM: f64 = 7000.0;
/// Reference gear ratios for gears 1..=6.
pub const DEFAULT_RATIOS: [f64; 6] = [3.5, 2.2, 1.5, 1.0, 0.8, 0.6];
/// Reference optimal upshift points for gears 1..=6.
pub const DEFAULT_OPTIMAL_SHIFT_RPM: [f64; 6] = [3000.0, 4000.0, 4500.0, 5000.0, 5500.0, 6000.0];

/// Immutable per-gear configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GearProfile {
    /// Multiplier controlling throttle responsiveness in this gear.
    pub ratio: f64,
    /// RPM at or above which an upshift is advised.
    pub optimal_shift_rpm: f64,
}

impl GearProfile {
    pub fn new(ratio: f64, optimal_shift_rpm: f64) -> Self {
        Self {
            ratio,
            optimal_shift_rpm,
        }
    }
}

/// Closed RPM interval every RPM value is saturated into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RpmRange {
    pub min: f64,
    pub max: f64,
}

impl RpmRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Saturate `rpm` into the range.
    pub fn clamp(&self, rpm: f64) -> f64 {
        rpm.clamp(self.min, self.max)
    }

    pub fn contains(&self, rpm: f64) -> bool {
        (self.min..=self.max).contains(&rpm)
    }

    /// Width of the range (max - min).
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Gear profiles indexed by gear number, starting at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GearTable(Vec<GearProfile>);

impl GearTable {
    pub fn new(profiles: Vec<GearProfile>) -> Self {
        Self(profiles)
    }

    /// Build a table from parallel ratio and shift-point slices.
    pub fn from_tables(ratios: &[f64], optimal_shift_rpm: &[f64]) -> DrivetrainResult<Self> {
        if ratios.len() != optimal_shift_rpm.len() {
            return Err(DrivetrainError::InvalidConfig {
                what: format!(
                    "ratio table has {} entries but shift table has {}",
                    ratios.len(),
                    optimal_shift_rpm.len()
                ),
            });
        }
        Ok(Self(
            ratios
                .iter()
                .zip(optimal_shift_rpm)
                .map(|(&ratio, &rpm)| GearProfile::new(ratio, rpm))
                .collect(),
        ))
    }

    /// Highest gear number (N_GEARS).
    pub fn top_gear(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Profile for `gear`. Gear numbers outside `1..=top_gear()` saturate to
    /// the nearest valid gear.
    ///
    /// # Panics
    ///
    /// Panics if the table is empty; validated configs never are.
    pub fn profile(&self, gear: usize) -> &GearProfile {
        let idx = gear.clamp(1, self.0.len()) - 1;
        &self.0[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &GearProfile)> {
        self.0.iter().enumerate().map(|(i, p)| (i + 1, p))
    }
}

impl Default for GearTable {
    fn default() -> Self {
        Self(
            DEFAULT_RATIOS
                .iter()
                .zip(DEFAULT_OPTIMAL_SHIFT_RPM.iter())
                .map(|(&ratio, &rpm)| GearProfile::new(ratio, rpm))
                .collect(),
        )
    }
}

/// Complete drivetrain configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivetrainConfig {
    /// Idle RPM; lower bound for rpm and target RPM.
    pub min_rpm: f64,
    /// Redline RPM; upper bound for rpm and target RPM.
    pub max_rpm: f64,
    /// Per-gear profiles, gear 1 first.
    pub gears: GearTable,
    /// Axis magnitude needed to trigger a shift.
    pub shift_threshold: f64,
    /// Minimum wall-clock interval between accepted shift triggers.
    pub debounce_ms: u64,
    /// Target RPM gained per tick of throttle, per unit of gear ratio.
    pub accel_gain: f64,
    /// Target RPM lost per tick off throttle, per unit of gear ratio.
    pub decel_gain: f64,
    /// Fraction of the remaining RPM error closed each tick.
    pub damping_factor: f64,
    /// Distance below the optimal shift point at which a downshift is advised.
    pub downshift_margin_rpm: f64,
}

impl Default for DrivetrainConfig {
    fn default() -> Self {
        Self {
            min_rpm: DEFAULT_MIN_RPM,
            max_rpm: DEFAULT_MAX_RPM,
            gears: GearTable::default(),
            shift_threshold: 0.8,
            debounce_ms: 500,
            accel_gain: 20.0,
            decel_gain: 30.0,
            damping_factor: 0.1,
            downshift_margin_rpm: 1500.0,
        }
    }
}

impl DrivetrainConfig {
    /// RPM bounds as a range.
    pub fn rpm_range(&self) -> RpmRange {
        RpmRange::new(self.min_rpm, self.max_rpm)
    }

    /// Number of forward gears (N_GEARS).
    pub fn top_gear(&self) -> usize {
        self.gears.top_gear()
    }

    /// Check every parameter; a config that passes can drive a simulation
    /// without any per-tick failure.
    pub fn validate(&self) -> DrivetrainResult<()> {
        ensure_finite(self.min_rpm, "min_rpm")?;
        ensure_finite(self.max_rpm, "max_rpm")?;
        if self.min_rpm < 0.0 {
            return Err(DrivetrainError::InvalidConfig {
                what: "min_rpm must be non-negative".to_string(),
            });
        }
        if self.min_rpm >= self.max_rpm {
            return Err(DrivetrainError::InvalidConfig {
                what: format!(
                    "min_rpm ({}) must be less than max_rpm ({})",
                    self.min_rpm, self.max_rpm
                ),
            });
        }
        if self.gears.is_empty() {
            return Err(DrivetrainError::InvalidConfig {
                what: "at least one gear is required".to_string(),
            });
        }
        if self.top_gear() > u8::MAX as usize {
            return Err(DrivetrainError::InvalidConfig {
                what: format!("too many gears: {}", self.top_gear()),
            });
        }
        for (gear, profile) in self.gears.iter() {
            ensure_positive(profile.ratio, "gear ratio")?;
            ensure_finite(profile.optimal_shift_rpm, "optimal_shift_rpm").map_err(|_| {
                DrivetrainError::InvalidConfig {
                    what: format!("gear {gear} optimal_shift_rpm is not finite"),
                }
            })?;
        }
        ensure_within(self.shift_threshold, f64::MIN_POSITIVE, 1.0, "shift_threshold")?;
        ensure_positive(self.accel_gain, "accel_gain")?;
        ensure_positive(self.decel_gain, "decel_gain")?;
        ensure_within(self.damping_factor, f64::MIN_POSITIVE, 1.0, "damping_factor")?;
        ensure_finite(self.downshift_margin_rpm, "downshift_margin_rpm")?;
        if self.downshift_margin_rpm < 0.0 {
            return Err(DrivetrainError::InvalidConfig {
                what: "downshift_margin_rpm must be non-negative".to_string(),
            });
        }
        Ok(())
    }
}

pub fn load_yaml(path: &Path) -> DrivetrainResult<DrivetrainConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: DrivetrainConfig = serde_yaml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

pub fn save_yaml(path: &Path, config: &DrivetrainConfig) -> DrivetrainResult<()> {
    config.validate()?;
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> DrivetrainResult<DrivetrainConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: DrivetrainConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load a config, picking the format from the file extension.
pub fn load(path: &Path) -> DrivetrainResult<DrivetrainConfig> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_config_is_valid() {
        let config = DrivetrainConfig::default();
        config.validate().unwrap();
        assert_eq!(config.top_gear(), 6);
        assert_eq!(config.gears.profile(1).ratio, 3.5);
        assert_eq!(config.gears.profile(6).optimal_shift_rpm, 6000.0);
    }

    #[test]
    fn profile_lookup_saturates() {
        let table = GearTable::default();
        assert_eq!(table.profile(0), table.profile(1));
        assert_eq!(table.profile(9), table.profile(6));
    }

    #[test]
    fn mismatched_tables_rejected() {
        let err = GearTable::from_tables(&[3.0, 2.0], &[3000.0]).unwrap_err();
        assert!(matches!(err, DrivetrainError::InvalidConfig { .. }));
    }

    #[test]
    fn invalid_configs_rejected() {
        let inverted = DrivetrainConfig {
            min_rpm: 7000.0,
            max_rpm: 800.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let no_gears = DrivetrainConfig {
            gears: GearTable::new(Vec::new()),
            ..Default::default()
        };
        assert!(no_gears.validate().is_err());

        let bad_damping = DrivetrainConfig {
            damping_factor: 1.5,
            ..Default::default()
        };
        assert!(bad_damping.validate().is_err());

        let zero_threshold = DrivetrainConfig {
            shift_threshold: 0.0,
            ..Default::default()
        };
        assert!(zero_threshold.validate().is_err());

        let nan_gain = DrivetrainConfig {
            accel_gain: f64::NAN,
            ..Default::default()
        };
        assert!(nan_gain.validate().is_err());

        let negative_ratio = DrivetrainConfig {
            gears: GearTable::new(vec![GearProfile::new(-1.0, 3000.0)]),
            ..Default::default()
        };
        assert!(negative_ratio.validate().is_err());
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let yaml = "max_rpm: 8000\naccel_gain: 25\n";
        let config: DrivetrainConfig = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.max_rpm, 8000.0);
        assert_eq!(config.accel_gain, 25.0);
        assert_eq!(config.min_rpm, DEFAULT_MIN_RPM);
        assert_eq!(config.top_gear(), 6);
    }

    #[test]
    fn gear_table_yaml_is_a_list() {
        let yaml = "gears:\n  - ratio: 3.0\n    optimal_shift_rpm: 4000\n  - ratio: 1.5\n    optimal_shift_rpm: 5000\n";
        let config: DrivetrainConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.top_gear(), 2);
        assert_eq!(config.gears.profile(2).ratio, 1.5);
    }

    #[test]
    fn rpm_range_clamps() {
        let range = RpmRange::new(800.0, 7000.0);
        assert_eq!(range.clamp(100.0), 800.0);
        assert_eq!(range.clamp(9000.0), 7000.0);
        assert_eq!(range.clamp(3000.0), 3000.0);
        assert_eq!(range.span(), 6200.0);
    }
}
