//! Simulation state and the engine that drives a single component instance.
//!
//! A [`Simulation`] is created by [`Simulation::initialize`], which runs the
//! component through instantiation, experiment setup, initialization, and the
//! initial discrete-state settling. From there each call to
//! [`Simulation::step`] advances time by at most one fixed step with explicit
//! Euler and reacts to time, state, and step events.
//!
//! # Modes
//!
//! ```text
//! Instantiated → InitializationMode → ContinuousTime ⇄ EventMode
//!                                            ↘             ↙
//!                                             Terminated
//! ```
//!
//! `Terminated` is absorbing. It is reached when the model asks to end the
//! simulation; failures leave the mode where it was so the caller can inspect
//! the state.

mod crossing;
mod euler;
mod handle;
mod lifecycle;
mod settle;
mod step;

pub use step::{Events, Step, StepReport};

use shuttle_core::{Component, EventInfo, Status, VariableDirectory};
use tracing::debug;

use crate::{
    Recorder,
    error::{Call, Error, Phase},
};

use handle::Handle;
use step::Pending;

/// Where the component is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Instantiated,
    InitializationMode,
    ContinuousTime,
    EventMode,
    Terminated,
}

/// Running totals of committed steps and handled events.
///
/// Counters only ever increase. More than one event counter may be bumped by
/// the same step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Counters {
    pub steps: usize,
    pub time_events: usize,
    pub state_events: usize,
    pub step_events: usize,
}

/// The fixed step grid.
///
/// Grid points are computed from the origin rather than accumulated, so
/// round-off does not drift. A time event realigns the origin to the event.
#[derive(Debug, Clone, Copy)]
struct Grid {
    origin: f64,
    steps: u64,
}

impl Grid {
    fn new(origin: f64) -> Self {
        Self { origin, steps: 0 }
    }

    #[allow(clippy::cast_precision_loss)]
    fn next(self, step_size: f64) -> f64 {
        self.origin + (self.steps + 1) as f64 * step_size
    }

    fn advance(&mut self) {
        self.steps += 1;
    }

    fn realign(&mut self, origin: f64) {
        *self = Self::new(origin);
    }
}

/// Everything owned by one simulation run of one component instance.
///
/// The instance is released exactly once, when the simulation is dropped or
/// torn down, whatever the outcome of the run.
pub struct Simulation<C: Component> {
    component: Handle<C>,
    mode: Mode,
    nx: usize,
    nz: usize,
    x: Vec<f64>,
    xdot: Vec<f64>,
    z: Vec<f64>,
    prez: Vec<f64>,
    start_time: f64,
    time: f64,
    step_size: f64,
    stop_time: f64,
    grid: Grid,
    event_info: EventInfo,
    directory: VariableDirectory,
    recorder: Recorder,
    counters: Counters,
    terminated: bool,
    fault: Option<Status>,
    pending: Option<Pending>,
    max_settle_iters: usize,
}

impl<C: Component> Simulation<C> {
    /// Returns `true` once there is nothing left to integrate.
    ///
    /// A step that failed after committing its time is not finished, even at
    /// the stop time.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.pending.is_none() && (self.terminated || self.time >= self.stop_time)
    }

    /// Returns `true` if the model asked to end the simulation.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the last time committed by the step executor.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[must_use]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    #[must_use]
    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    #[must_use]
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    #[must_use]
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Number of continuous states.
    #[must_use]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of event indicators.
    #[must_use]
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// Continuous states as of the last advance.
    #[must_use]
    pub fn states(&self) -> &[f64] {
        &self.x
    }

    /// Derivatives the last advance was computed from.
    #[must_use]
    pub fn derivatives(&self) -> &[f64] {
        &self.xdot
    }

    /// Most recent event indicator readings.
    #[must_use]
    pub fn event_indicators(&self) -> &[f64] {
        &self.z
    }

    #[must_use]
    pub fn event_info(&self) -> &EventInfo {
        &self.event_info
    }

    #[must_use]
    pub fn directory(&self) -> &VariableDirectory {
        &self.directory
    }

    #[must_use]
    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Returns the status of the most recent failed step, if any.
    #[must_use]
    pub fn fault(&self) -> Option<Status> {
        self.fault
    }

    /// Takes the recorder out, leaving an empty one of the same kind behind.
    pub(crate) fn take_recorder(&mut self) -> Recorder {
        let empty = Recorder::new(self.recorder.recording(), 0);
        std::mem::replace(&mut self.recorder, empty)
    }

    /// Ends the run and releases the component instance.
    ///
    /// The instance is asked to terminate unless a step failed fatally, and is
    /// then freed. It is freed even if terminating fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] if the component fails to terminate.
    pub fn teardown(mut self) -> Result<(), Error> {
        if self.fault == Some(Status::Fatal) || self.mode == Mode::Instantiated {
            debug!(time = self.time, "releasing instance without terminating");
            return Ok(());
        }

        let status = self.component.terminate();
        debug!(time = self.time, %status, "instance terminated");
        Phase::Lifecycle.check(Call::Terminate, status, self.time)
    }

    /// Marks the run as ended at the model's request.
    fn mark_terminated(&mut self) {
        self.terminated = true;
        self.mode = Mode::Terminated;
        self.event_info.terminate_simulation = true;
    }
}
