//! A fixed-step driver for hybrid continuous/discrete-event components.
//!
//! The driver instantiates a [`Component`], runs it through its lifecycle,
//! integrates its continuous states with explicit Euler on a fixed grid, and
//! handles the three kinds of events a component can raise:
//!
//! - **time events**, scheduled by the component, land the step exactly on the
//!   scheduled time
//! - **state events** fire when an event indicator changes sign over a step
//! - **step events** are requested by the component after completing a step
//!
//! # Modules
//!
//! - [`batch`] — run from start to stop in one call and collect every series
//! - [`Stepper`] — advance one step per pull, for hosts that drive the loop
//! - [`Simulation`] — the underlying engine, for callers that need full control
//!
//! [`simulate`] picks between the two driving modes from a [`DriveMode`].
//!
//! # Features
//!
//! - `serde` — derives `Serialize`/`Deserialize` for [`Experiment`],
//!   [`batch::Summary`], and [`Counters`].
//!
//! [`Component`]: shuttle_core::Component

pub mod batch;

mod error;
mod experiment;
mod incremental;
mod recorder;
mod simulation;

#[cfg(test)]
mod test_utils;

pub use error::{Buffer, Call, Error};
pub use experiment::{DriveMode, Experiment, ExperimentError};
pub use incremental::{Pull, Sample, Stepper};
pub use recorder::{Recorder, Recording};
pub use simulation::{Counters, Events, Mode, Simulation, Step, StepReport};

use shuttle_core::{Binding, VariableDirectory};

/// The outcome of [`simulate`].
pub enum Run<C: shuttle_core::Component> {
    /// The run finished; every series was collected.
    Batch(batch::Summary),

    /// The simulation is initialized and waits for the caller to pull.
    Incremental(Stepper<C>),
}

/// Runs a component in the given driving mode.
///
/// In [`DriveMode::Batch`] the whole run happens before this returns. In
/// [`DriveMode::Incremental`] only initialization happens; the returned
/// [`Stepper`] advances on demand.
///
/// # Errors
///
/// Returns any failure from initialization, and in batch mode from any step.
pub fn simulate<B: Binding>(
    binding: &B,
    experiment: &Experiment,
    directory: VariableDirectory,
    mode: DriveMode,
) -> Result<Run<B::Component>, Error> {
    match mode {
        DriveMode::Batch => batch::run_unobserved(binding, experiment, directory).map(Run::Batch),
        DriveMode::Incremental => {
            Stepper::start(binding, experiment, directory).map(Run::Incremental)
        }
    }
}
