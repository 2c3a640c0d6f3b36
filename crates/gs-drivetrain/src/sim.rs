//! Tick driver and fixed-rate simulation runner.
//!
//! Each tick runs, in order: debounce clock, shift controller, throttle
//! model, RPM integrator, shift advisor. Nothing inside a tick blocks or
//! fails.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::advisor::{Advisory, ShiftAdvisor};
use crate::config::DrivetrainConfig;
use crate::error::{DrivetrainError, DrivetrainResult};
use crate::input::{InputSample, InputSource};
use crate::integrator::RpmIntegrator;
use crate::presenter::Presenter;
use crate::shift::{ShiftController, ShiftOutcome};
use crate::state::{DrivetrainState, Snapshot};
use crate::throttle::ThrottleModel;

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub snapshot: Snapshot,
    pub shift: ShiftOutcome,
}

/// Owns the drivetrain state and the components that mutate it.
#[derive(Debug, Clone)]
pub struct Drivetrain {
    config: DrivetrainConfig,
    state: DrivetrainState,
    shift: ShiftController,
    throttle: ThrottleModel,
    integrator: RpmIntegrator,
    advisor: ShiftAdvisor,
    advisory: Advisory,
    tick: u64,
    time_s: f64,
}

impl Drivetrain {
    /// Build a drivetrain at its start-of-simulation state.
    ///
    /// # Errors
    ///
    /// Returns error if `config` fails validation.
    pub fn new(config: DrivetrainConfig) -> DrivetrainResult<Self> {
        config.validate()?;
        let state = DrivetrainState::new(&config);
        Ok(Self::assemble(config, state))
    }

    /// Build a drivetrain starting from an explicit state.
    ///
    /// # Errors
    ///
    /// Returns error if `config` fails validation or `state` breaks its
    /// invariants under `config`.
    ///
    /// A closed shift latch stays closed for a full debounce interval from
    /// the first tick.
    pub fn with_state(config: DrivetrainConfig, state: DrivetrainState) -> DrivetrainResult<Self> {
        config.validate()?;
        let mut rebuilt =
            DrivetrainState::with_values(&config, state.gear(), state.rpm(), state.target_rpm())?;
        rebuilt.set_can_shift(state.can_shift());
        Ok(Self::assemble(config, rebuilt))
    }

    fn assemble(config: DrivetrainConfig, state: DrivetrainState) -> Self {
        let advisor = ShiftAdvisor::from_config(&config);
        let advisory = advisor.evaluate(&state);
        let mut shift = ShiftController::from_config(&config);
        if !state.can_shift() {
            shift.hold_latch();
        }
        Self {
            shift,
            throttle: ThrottleModel::from_config(&config),
            integrator: RpmIntegrator::from_config(&config),
            advisor,
            advisory,
            state,
            config,
            tick: 0,
            time_s: 0.0,
        }
    }

    pub fn config(&self) -> &DrivetrainConfig {
        &self.config
    }

    pub fn state(&self) -> &DrivetrainState {
        &self.state
    }

    pub fn advisory(&self) -> Advisory {
        self.advisory
    }

    pub fn shift_controller(&self) -> &ShiftController {
        &self.shift
    }

    /// Return to the start-of-simulation state.
    pub fn reset(&mut self) {
        *self = Self::assemble(self.config.clone(), DrivetrainState::new(&self.config));
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            time_s: self.time_s,
            gear: self.state.gear(),
            rpm: self.state.rpm(),
            target_rpm: self.state.target_rpm(),
            advisory: self.advisory,
        }
    }

    /// Advance one tick with `elapsed` wall-clock time since the previous one.
    pub fn tick(&mut self, input: InputSample, elapsed: Duration) -> TickReport {
        self.shift.advance_clock(elapsed, &mut self.state);
        let shift = self.shift.handle_shift_input(input.shift_axis, &mut self.state);
        self.throttle.apply(input.throttle, &mut self.state);
        self.integrator.step(&mut self.state);
        self.advisory = self.advisor.evaluate(&self.state);

        self.tick += 1;
        self.time_s += elapsed.as_secs_f64();

        let snapshot = self.snapshot();
        trace!(
            tick = snapshot.tick,
            gear = snapshot.gear,
            rpm = snapshot.rpm,
            target_rpm = snapshot.target_rpm,
            advisory = %snapshot.advisory,
            "tick"
        );
        TickReport { snapshot, shift }
    }

    /// Sample `source`, tick, and report to `presenter`.
    pub fn tick_with<I, P>(
        &mut self,
        source: &mut I,
        presenter: &mut P,
        elapsed: Duration,
    ) -> TickReport
    where
        I: InputSource + ?Sized,
        P: Presenter + ?Sized,
    {
        let report = self.tick(source.sample(), elapsed);
        if let Some(gear) = report.shift.new_gear() {
            presenter.on_gear_change(gear);
        }
        presenter.present(&report.snapshot);
        report
    }
}

/// Options for fixed-rate runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimOptions {
    /// Wall-clock time per tick
    pub tick: Duration,
    /// Number of ticks to run
    pub ticks: u64,
    /// Record every N-th tick (decimation)
    pub record_every: u64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs_f64(1.0 / 60.0),
            ticks: 600,
            record_every: 1,
        }
    }
}

impl SimOptions {
    /// Options for `ticks` ticks at `hz` ticks per second.
    ///
    /// # Errors
    ///
    /// Returns error if `hz` is not a positive finite number.
    pub fn at_rate(hz: f64, ticks: u64) -> DrivetrainResult<Self> {
        if !(hz.is_finite() && hz > 0.0) {
            return Err(DrivetrainError::InvalidArg {
                what: "tick rate must be positive",
            });
        }
        let tick = Duration::try_from_secs_f64(1.0 / hz).map_err(|_| {
            DrivetrainError::InvalidArg {
                what: "tick rate too low",
            }
        })?;
        Ok(Self {
            tick,
            ticks,
            ..Default::default()
        })
    }
}

/// Snapshots recorded during a run, starting with the initial state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimRecord {
    pub snapshots: Vec<Snapshot>,
    /// Gear after each accepted shift, in order.
    pub gear_changes: Vec<usize>,
}

impl SimRecord {
    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }
}

/// Run `drivetrain` for `opts.ticks` ticks at a fixed tick interval.
pub fn run_sim<I, P>(
    drivetrain: &mut Drivetrain,
    source: &mut I,
    presenter: &mut P,
    opts: &SimOptions,
) -> DrivetrainResult<SimRecord>
where
    I: InputSource + ?Sized,
    P: Presenter + ?Sized,
{
    if opts.record_every == 0 {
        return Err(DrivetrainError::InvalidArg {
            what: "record_every must be positive",
        });
    }

    info!(ticks = opts.ticks, tick_s = opts.tick.as_secs_f64(), "run start");

    let mut record = SimRecord {
        snapshots: vec![drivetrain.snapshot()],
        gear_changes: Vec::new(),
    };

    let mut step = 0;
    while step < opts.ticks {
        let report = drivetrain.tick_with(source, presenter, opts.tick);
        step += 1;

        if let Some(gear) = report.shift.new_gear() {
            record.gear_changes.push(gear);
        }
        if step % opts.record_every == 0 {
            record.snapshots.push(report.snapshot);
        }
    }

    // Always record final state
    if step % opts.record_every != 0 {
        record.snapshots.push(drivetrain.snapshot());
    }

    let last = drivetrain.snapshot();
    info!(
        gear = last.gear,
        rpm = last.rpm,
        shifts = record.gear_changes.len(),
        "run finished"
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{IdleInput, ScriptedInput};
    use crate::presenter::{NullPresenter, RecordingPresenter};

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn new_drivetrain_idles() {
        let dt = Drivetrain::new(DrivetrainConfig::default()).unwrap();
        let snap = dt.snapshot();
        assert_eq!(snap.tick, 0);
        assert_eq!(snap.gear, 1);
        assert_eq!(snap.rpm, 800.0);
        assert_eq!(snap.advisory, Advisory::None);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = DrivetrainConfig {
            damping_factor: 0.0,
            ..Default::default()
        };
        assert!(Drivetrain::new(config).is_err());
    }

    #[test]
    fn idle_input_decays_toward_idle() {
        let config = DrivetrainConfig::default();
        let state = DrivetrainState::with_values(&config, 2, 4000.0, 4000.0).unwrap();
        let mut dt = Drivetrain::with_state(config, state).unwrap();
        let mut prev = dt.state().rpm();
        for _ in 0..300 {
            let report = dt.tick(InputSample::idle(), FRAME);
            assert!(report.snapshot.rpm <= prev);
            prev = report.snapshot.rpm;
        }
        assert!(prev < 820.0);
        assert_eq!(dt.state().target_rpm(), 800.0);
    }

    #[test]
    fn tick_accumulates_time() {
        let mut dt = Drivetrain::new(DrivetrainConfig::default()).unwrap();
        dt.tick(InputSample::idle(), Duration::from_millis(10));
        dt.tick(InputSample::idle(), Duration::from_millis(30));
        let snap = dt.snapshot();
        assert_eq!(snap.tick, 2);
        assert!((snap.time_s - 0.04).abs() < 1e-12);
    }

    #[test]
    fn gear_changes_reach_presenter() {
        let mut dt = Drivetrain::new(DrivetrainConfig::default()).unwrap();
        let mut presenter = RecordingPresenter::default();
        let mut source = ScriptedInput::default()
            .then(1, false, -1.0)
            .then(40, false, 0.0)
            .then(1, false, -1.0)
            .then(1, false, 1.0);
        for _ in 0..43 {
            dt.tick_with(&mut source, &mut presenter, FRAME);
        }
        assert_eq!(presenter.gear_changes, vec![2, 3]);
        assert_eq!(presenter.snapshots.len(), 43);
        assert_eq!(dt.state().gear(), 3);
    }

    #[test]
    fn run_sim_records_with_decimation() {
        let mut dt = Drivetrain::new(DrivetrainConfig::default()).unwrap();
        let opts = SimOptions {
            tick: FRAME,
            ticks: 25,
            record_every: 10,
        };
        let record = run_sim(&mut dt, &mut IdleInput, &mut NullPresenter, &opts).unwrap();
        // initial, 10, 20, final (25)
        assert_eq!(record.snapshots.len(), 4);
        assert_eq!(record.last().unwrap().tick, 25);
    }

    #[test]
    fn run_sim_rejects_zero_decimation() {
        let mut dt = Drivetrain::new(DrivetrainConfig::default()).unwrap();
        let opts = SimOptions {
            record_every: 0,
            ..Default::default()
        };
        assert!(run_sim(&mut dt, &mut IdleInput, &mut NullPresenter, &opts).is_err());
    }

    #[test]
    fn reset_restores_start_state() {
        let mut dt = Drivetrain::new(DrivetrainConfig::default()).unwrap();
        dt.tick(InputSample::new(true, -1.0), FRAME);
        assert_eq!(dt.state().gear(), 2);
        dt.reset();
        assert_eq!(dt.snapshot().tick, 0);
        assert_eq!(dt.state().gear(), 1);
        assert!(dt.state().can_shift());
    }

    #[test]
    fn sim_options_at_rate() {
        let opts = SimOptions::at_rate(50.0, 10).unwrap();
        assert_eq!(opts.tick, Duration::from_millis(20));
        assert!(SimOptions::at_rate(0.0, 10).is_err());
        assert!(SimOptions::at_rate(f64::NAN, 10).is_err());
        assert!(SimOptions::at_rate(1e-30, 10).is_err());
    }

    #[test]
    fn with_state_keeps_closed_latch() {
        let mut dt = Drivetrain::new(DrivetrainConfig::default()).unwrap();
        dt.tick(InputSample::new(false, -1.0), Duration::ZERO);
        assert_eq!(dt.state().gear(), 2);
        assert!(!dt.state().can_shift());

        let config = dt.config().clone();
        let state = dt.state().clone();
        let mut resumed = Drivetrain::with_state(config, state).unwrap();
        assert!(!resumed.state().can_shift());
        assert!(resumed.shift_controller().debounce().is_armed());

        let report = resumed.tick(InputSample::new(false, -1.0), FRAME);
        assert_eq!(report.shift, ShiftOutcome::Debounced);
        assert_eq!(resumed.state().gear(), 2);

        resumed.tick(InputSample::idle(), Duration::from_millis(500));
        assert!(resumed.state().can_shift());
        let report = resumed.tick(InputSample::new(false, -1.0), FRAME);
        assert_eq!(report.shift.new_gear(), Some(3));
    }
}
