use shuttle_core::{Component, Status, StepOutcome};
use tracing::{debug, info, trace, warn};

use crate::error::{Call, Error, Phase};

use super::{Mode, Simulation, crossing, euler, settle::Settled};

/// The events handled by one step.
///
/// More than one kind of event may fire in the same step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Events {
    /// A scheduled event time was reached.
    pub time: bool,

    /// An event indicator changed sign.
    pub state: bool,

    /// The component signaled an event after completing the step.
    pub step: bool,
}

impl Events {
    /// Returns `true` if any event fired.
    #[must_use]
    pub fn any(self) -> bool {
        self.time || self.state || self.step
    }
}

/// A committed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// The step count after this step (1 for the first step).
    pub step: usize,

    /// The committed time.
    pub time: f64,

    /// The size of this step, shorter than the fixed step when it was cut by
    /// a time event or by the stop time.
    pub dt: f64,

    pub events: Events,
}

/// What one invocation of the step executor did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Time advanced and the step was committed.
    Advanced(StepReport),

    /// The model asked to end the simulation at `time`.
    ///
    /// The step that made the request is not counted.
    Terminated { time: f64 },

    /// There was nothing left to do: the stop time was reached or the model
    /// already asked to end the simulation.
    Idle,
}

impl Step {
    /// Returns the status equivalent of this step.
    ///
    /// [`Step::Idle`] maps to [`Status::Discard`]; everything else is `OK`.
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::Advanced(_) | Self::Terminated { .. } => Status::Ok,
            Self::Idle => Status::Discard,
        }
    }
}

/// A step whose time is committed but whose remaining stages have not all
/// succeeded yet.
#[derive(Debug, Clone, Copy)]
pub(super) struct Pending {
    dt: f64,
    events: Events,
    stage: Stage,
}

/// The next stage of a pending step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Indicators,
    Complete,
    Events,
    Sample,
}

impl<C: Component> Simulation<C> {
    /// Advances the simulation by at most one fixed step.
    ///
    /// # Algorithm
    ///
    /// 1. Read the continuous states and their derivatives.
    /// 2. Propose the next grid point, clipped to the stop time. If a time
    ///    event is scheduled at or before it, land exactly on the event.
    /// 3. Advance the states by explicit Euler over the resulting `dt`.
    /// 4. Hand the new time and states to the component and commit the time.
    /// 5. Refresh the event indicators and look for sign changes.
    /// 6. Complete the integrator step; the component may signal a step event
    ///    or ask to end the simulation.
    /// 7. If any event fired, enter event mode, count the events, settle the
    ///    discrete states, and return to continuous-time mode.
    /// 8. Record the tracked variables and count the step.
    ///
    /// A model request to end the simulation, in step 6 or while settling, is
    /// a successful outcome and returns [`Step::Terminated`].
    ///
    /// Once the simulation is finished this returns [`Step::Idle`] without
    /// calling the component.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Step`] if a component call returns a status above
    /// warning, or [`Error::NotSettled`] if the discrete states do not settle.
    /// The simulation is left as it was at the failure, not terminated, and
    /// may be stepped again. A failure after the new time was committed keeps
    /// the events detected so far, and the next call resumes the step at the
    /// call that failed instead of advancing again.
    pub fn step(&mut self) -> Result<Step, Error> {
        if self.is_finished() {
            trace!(time = self.time, "nothing left to do");
            return Ok(Step::Idle);
        }

        let result = self.advance();
        if let Err(err) = &result {
            warn!(time = self.time, %err, "step failed");
            self.fault = Some(err.status());
        }
        result
    }

    fn advance(&mut self) -> Result<Step, Error> {
        let phase = Phase::Step;

        let mut pending = match self.pending.take() {
            Some(pending) => {
                debug!(time = self.time, stage = ?pending.stage, "resuming step");
                pending
            }
            None => self.integrate(phase)?,
        };

        let result = self.finish(&mut pending, phase);
        if result.is_err() {
            self.pending = Some(pending);
        }
        result
    }

    /// Moves the states over one step and commits the new time.
    ///
    /// Nothing is committed if this fails, so the whole step can be redone.
    fn integrate(&mut self, phase: Phase) -> Result<Pending, Error> {
        let previous = self.time;

        let status = self.component.get_continuous_states(&mut self.x);
        phase.check(Call::GetContinuousStates, status, previous)?;

        let status = self.component.get_derivatives(&mut self.xdot);
        phase.check(Call::GetDerivatives, status, previous)?;

        let (next, time_event) = self.next_time();
        let dt = next - previous;

        let status = self.component.set_time(next);
        phase.check(Call::SetTime, status, previous)?;

        euler::advance(&mut self.x, &self.xdot, dt);
        let status = self.component.set_continuous_states(&self.x);
        phase.check(Call::SetContinuousStates, status, previous)?;

        self.time = next;
        if time_event {
            self.grid.realign(next);
        } else {
            self.grid.advance();
        }
        crossing::carry(&mut self.prez, &self.z);

        Ok(Pending {
            dt,
            events: Events {
                time: time_event,
                ..Events::default()
            },
            stage: Stage::Indicators,
        })
    }

    /// Runs the remaining stages of a step whose time is committed.
    ///
    /// Each stage that succeeds is recorded in `pending`, so a retry after a
    /// failure resumes at the stage that failed.
    fn finish(&mut self, pending: &mut Pending, phase: Phase) -> Result<Step, Error> {
        if pending.stage == Stage::Indicators {
            pending.events.state = self.nz > 0 && self.detect_state_event(phase)?;
            pending.stage = Stage::Complete;
        }

        if pending.stage == Stage::Complete {
            let mut outcome = StepOutcome::default();
            let status = self.component.completed_integrator_step(true, &mut outcome);
            phase.check(Call::CompletedIntegratorStep, status, self.time)?;

            if outcome.terminate_simulation {
                info!(time = self.time, "model requested termination");
                self.mark_terminated();
                return Ok(Step::Terminated { time: self.time });
            }

            pending.events.step = outcome.enter_event_mode;
            self.count(pending.events);
            pending.stage = Stage::Events;
        }

        if pending.stage == Stage::Events {
            if pending.events.any() {
                if let Settled::Terminated = self.handle_events(phase)? {
                    return Ok(Step::Terminated { time: self.time });
                }
            }
            pending.stage = Stage::Sample;
        }

        self.recorder
            .sample(&mut *self.component, &self.directory, self.time, phase)?;
        self.counters.steps += 1;
        trace!(
            step = self.counters.steps,
            time = self.time,
            dt = pending.dt,
            "step committed"
        );

        Ok(Step::Advanced(StepReport {
            step: self.counters.steps,
            time: self.time,
            dt: pending.dt,
            events: pending.events,
        }))
    }

    /// Returns the next time and whether it is a time event.
    ///
    /// A scheduled time at or before the current time has already been handled
    /// and is ignored.
    fn next_time(&self) -> (f64, bool) {
        let candidate = self.grid.next(self.step_size).min(self.stop_time);

        match self.event_info.next_event_time() {
            Some(event_time) if event_time > self.time && candidate >= event_time => {
                (event_time, true)
            }
            _ => (candidate, false),
        }
    }

    /// Refreshes the event indicators and reports whether any changed sign.
    fn detect_state_event(&mut self, phase: Phase) -> Result<bool, Error> {
        let status = self.component.get_event_indicators(&mut self.z);
        phase.check(Call::GetEventIndicators, status, self.time)?;

        let mut fired = false;
        for indicator in crossing::crossings(&self.prez, &self.z) {
            let direction = if self.prez[indicator] > 0.0 {
                "falling"
            } else {
                "rising"
            };
            debug!(time = self.time, indicator, direction, "state event");
            fired = true;
        }
        Ok(fired)
    }

    fn count(&mut self, events: Events) {
        if events.time {
            self.counters.time_events += 1;
            debug!(time = self.time, "time event");
        }
        if events.state {
            self.counters.state_events += 1;
        }
        if events.step {
            self.counters.step_events += 1;
            debug!(time = self.time, "step event");
        }
    }

    fn handle_events(&mut self, phase: Phase) -> Result<Settled, Error> {
        if self.mode != Mode::EventMode {
            let status = self.component.enter_event_mode();
            phase.check(Call::EnterEventMode, status, self.time)?;
            self.mode = Mode::EventMode;
        }

        if let Settled::Terminated = self.settle(phase)? {
            return Ok(Settled::Terminated);
        }

        let status = self.component.enter_continuous_time_mode();
        phase.check(Call::EnterContinuousTimeMode, status, self.time)?;
        self.mode = Mode::ContinuousTime;

        // Compare the next step against the post-event indicators.
        if self.nz > 0 {
            let status = self.component.get_event_indicators(&mut self.z);
            phase.check(Call::GetEventIndicators, status, self.time)?;
        }

        Ok(Settled::Continue)
    }
}
