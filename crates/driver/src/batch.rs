//! Batch driving: run a component from start to stop in one call.
//!
//! A batch run initializes the component, steps it until the stop time is
//! reached or the model asks to end the simulation, records every tracked
//! variable after each committed step, and tears the instance down.
//!
//! # Example
//!
//! ```ignore
//! use shuttle_driver::{Experiment, batch};
//!
//! let experiment = Experiment::new(0.0, 3.0, 0.01)?;
//! let summary = batch::run_unobserved(&binding, &experiment, directory)?;
//!
//! if let (Some(time), Some(height)) = (summary.series("time"), summary.series("h")) {
//!     for (t, h) in time.iter().zip(height) {
//!         println!("t={t}: h={h}");
//!     }
//! }
//! ```

mod action;
mod event;
mod summary;

pub use action::Action;
pub use event::Event;
pub use summary::{Series, Status, Summary};

use shuttle_core::{Binding, Component, Observer, VariableDirectory};
use tracing::{info, warn};

use crate::{Error, Experiment, Recording, Simulation, Step};

/// Runs a component from the experiment's start time to its stop time.
///
/// # Algorithm
///
/// 1. Initialize the component and record the initial sample.
/// 2. Step until there is nothing left to do, emitting an [`Event`] to the
///    observer after every committed step.
/// 3. Tear the instance down and collect the recorded series.
///
/// The series include the initial sample, so each numeric series has
/// `steps + 1` values.
///
/// # Observer
///
/// The observer may return [`Action::StopEarly`] to end the run after the
/// current step.
///
/// # Errors
///
/// Returns the first initialization or step failure. The instance is still
/// terminated (unless the failure was fatal) and freed.
pub fn run<B, Obs>(
    binding: &B,
    experiment: &Experiment,
    directory: VariableDirectory,
    mut observer: Obs,
) -> Result<Summary, Error>
where
    B: Binding,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let mut simulation = Simulation::initialize(binding, experiment, directory, Recording::Series)?;

    let status = match drive(&mut simulation, &mut observer) {
        Ok(status) => status,
        Err(err) => {
            if let Err(teardown) = simulation.teardown() {
                warn!(%teardown, "teardown after a failed run also failed");
            }
            return Err(err);
        }
    };

    let summary = summarize(&mut simulation, status);
    simulation.teardown()?;

    info!(
        status = ?summary.status,
        final_time = summary.final_time,
        counters = ?summary.counters(),
        "batch run finished"
    );
    Ok(summary)
}

/// Runs a component from start to stop without observation.
///
/// This is a convenience wrapper around [`run`] that discards events.
///
/// # Errors
///
/// Returns the first initialization or step failure.
pub fn run_unobserved<B: Binding>(
    binding: &B,
    experiment: &Experiment,
    directory: VariableDirectory,
) -> Result<Summary, Error> {
    run(binding, experiment, directory, ())
}

fn drive<C, Obs>(simulation: &mut Simulation<C>, observer: &mut Obs) -> Result<Status, Error>
where
    C: Component,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    loop {
        match simulation.step()? {
            Step::Advanced(report) => {
                let event = Event {
                    report,
                    values: simulation.recorder().latest(),
                };
                if let Some(Action::StopEarly) = observer.observe(&event) {
                    return Ok(Status::StoppedByObserver);
                }
            }
            Step::Terminated { .. } => return Ok(Status::Terminated),
            Step::Idle if simulation.is_terminated() => return Ok(Status::Terminated),
            Step::Idle => return Ok(Status::Complete),
        }
    }
}

fn summarize<C: Component>(simulation: &mut Simulation<C>, status: Status) -> Summary {
    let recorder = simulation.take_recorder();
    let series = simulation
        .directory()
        .iter()
        .zip(recorder.into_series())
        .map(|(variable, values)| Series {
            name: variable.name.clone(),
            values,
        })
        .collect();

    let counters = simulation.counters();
    Summary {
        status,
        start_time: simulation.start_time(),
        stop_time: simulation.stop_time(),
        final_time: simulation.time(),
        step_size: simulation.step_size(),
        steps: counters.steps,
        time_events: counters.time_events,
        state_events: counters.state_events,
        step_events: counters.step_events,
        terminated: simulation.is_terminated(),
        series,
    }
}
