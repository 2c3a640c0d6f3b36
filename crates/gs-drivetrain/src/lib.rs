//! Drivetrain simulation core for gearsim.
//!
//! Simulates engine RPM behaviour driven by controller input:
//! - gear state with debounced, saturating shifts
//! - throttle-driven target RPM accumulator
//! - first-order RPM smoothing toward the target
//! - shift-point advisory from a per-gear table
//!
//! # Architecture
//!
//! [`Drivetrain`] owns a single [`DrivetrainState`] and runs the components
//! in a fixed order each tick. Input arrives through [`InputSource`];
//! results leave through [`Presenter`] as read-only [`Snapshot`]s. Rendering
//! and audio live entirely behind the presenter seam.

pub mod advisor;
pub mod config;
pub mod error;
pub mod input;
pub mod integrator;
pub mod presenter;
pub mod shift;
pub mod sim;
pub mod state;
pub mod throttle;

pub use advisor::{Advisory, ShiftAdvisor};
pub use config::{DrivetrainConfig, GearProfile, GearTable, RpmRange};
pub use error::{DrivetrainError, DrivetrainResult};
pub use input::{IdleInput, InputSample, InputSegment, InputSource, ScriptedInput};
pub use integrator::RpmIntegrator;
pub use presenter::{GaugeReading, NullPresenter, Presenter, RecordingPresenter};
pub use shift::{DebounceTimer, ShiftController, ShiftDirection, ShiftOutcome};
pub use sim::{Drivetrain, SimOptions, SimRecord, TickReport, run_sim};
pub use state::{DrivetrainState, Snapshot};
pub use throttle::ThrottleModel;
