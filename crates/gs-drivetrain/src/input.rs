//! Controller input sampling.
//!
//! The core only sees [`InputSample`]s; where they come from (gamepad,
//! keyboard, a script) is up to the [`InputSource`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DrivetrainError, DrivetrainResult};

/// One tick's worth of controller input.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputSample {
    /// Throttle trigger pressed.
    pub throttle: bool,
    /// Shift axis in [-1, 1]; negative is forward (upshift).
    pub shift_axis: f64,
}

impl InputSample {
    pub fn new(throttle: bool, shift_axis: f64) -> Self {
        Self {
            throttle,
            shift_axis,
        }
    }

    /// No throttle, axis centered. Used when no device is available.
    pub fn idle() -> Self {
        Self::default()
    }
}

/// Produces one input sample per tick.
pub trait InputSource {
    fn sample(&mut self) -> InputSample;
}

/// Source with nothing connected.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleInput;

impl InputSource for IdleInput {
    fn sample(&mut self) -> InputSample {
        InputSample::idle()
    }
}

impl<F> InputSource for F
where
    F: FnMut() -> InputSample,
{
    fn sample(&mut self) -> InputSample {
        self()
    }
}

/// A run of identical samples held for a number of ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputSegment {
    pub ticks: u64,
    #[serde(default)]
    pub throttle: bool,
    #[serde(default)]
    pub shift_axis: f64,
}

impl InputSegment {
    pub fn new(ticks: u64, throttle: bool, shift_axis: f64) -> Self {
        Self {
            ticks,
            throttle,
            shift_axis,
        }
    }
}

/// Plays back a list of segments, then reports idle input forever.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScriptedInput {
    segments: Vec<InputSegment>,
    #[serde(skip)]
    cursor: usize,
    #[serde(skip)]
    used: u64,
}

impl ScriptedInput {
    pub fn new(segments: Vec<InputSegment>) -> Self {
        Self {
            segments,
            cursor: 0,
            used: 0,
        }
    }

    pub fn from_yaml_str(content: &str) -> DrivetrainResult<Self> {
        let segments: Vec<InputSegment> = serde_yaml::from_str(content)?;
        Ok(Self::new(segments))
    }

    /// Load a script: a YAML list of `{ticks, throttle, shift_axis}`.
    pub fn load_yaml(path: &Path) -> DrivetrainResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Push a segment to the end of the script.
    pub fn then(mut self, ticks: u64, throttle: bool, shift_axis: f64) -> Self {
        self.segments.push(InputSegment::new(ticks, throttle, shift_axis));
        self
    }

    /// Total scripted ticks before the source goes idle.
    pub fn total_ticks(&self) -> u64 {
        self.segments.iter().map(|s| s.ticks).sum()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.segments.len()
    }

    /// Reject scripts the shift controller would only ever ignore: axis
    /// values outside [-1, 1] or NaN.
    pub fn validate(&self) -> DrivetrainResult<()> {
        for (i, seg) in self.segments.iter().enumerate() {
            if !(-1.0..=1.0).contains(&seg.shift_axis) {
                return Err(DrivetrainError::InvalidConfig {
                    what: format!(
                        "script segment {i}: shift_axis {} outside [-1, 1]",
                        seg.shift_axis
                    ),
                });
            }
        }
        Ok(())
    }
}

impl InputSource for ScriptedInput {
    fn sample(&mut self) -> InputSample {
        while let Some(seg) = self.segments.get(self.cursor) {
            if self.used < seg.ticks {
                self.used += 1;
                return InputSample::new(seg.throttle, seg.shift_axis);
            }
            self.cursor += 1;
            self.used = 0;
        }
        InputSample::idle()
    }
}
