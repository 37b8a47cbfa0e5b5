use std::fmt;

use shuttle_core::{AllocError, Status};
use tracing::warn;

use crate::ExperimentError;

/// A component operation, used to report which call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    SetDebugLogging,
    SetupExperiment,
    EnterInitializationMode,
    ExitInitializationMode,
    NewDiscreteStates,
    EnterContinuousTimeMode,
    EnterEventMode,
    GetContinuousStates,
    GetDerivatives,
    SetContinuousStates,
    SetTime,
    GetEventIndicators,
    CompletedIntegratorStep,
    GetReal,
    GetInteger,
    Terminate,
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SetDebugLogging => "set_debug_logging",
            Self::SetupExperiment => "setup_experiment",
            Self::EnterInitializationMode => "enter_initialization_mode",
            Self::ExitInitializationMode => "exit_initialization_mode",
            Self::NewDiscreteStates => "new_discrete_states",
            Self::EnterContinuousTimeMode => "enter_continuous_time_mode",
            Self::EnterEventMode => "enter_event_mode",
            Self::GetContinuousStates => "get_continuous_states",
            Self::GetDerivatives => "get_derivatives",
            Self::SetContinuousStates => "set_continuous_states",
            Self::SetTime => "set_time",
            Self::GetEventIndicators => "get_event_indicators",
            Self::CompletedIntegratorStep => "completed_integrator_step",
            Self::GetReal => "get_real",
            Self::GetInteger => "get_integer",
            Self::Terminate => "terminate",
        };
        f.write_str(name)
    }
}

/// A buffer owned by a simulation: the four working buffers and the recorded
/// series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Buffer {
    States,
    Derivatives,
    EventIndicators,
    PreviousEventIndicators,
    Series,
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::States => "state",
            Self::Derivatives => "derivative",
            Self::EventIndicators => "event indicator",
            Self::PreviousEventIndicators => "previous event indicator",
            Self::Series => "series",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while driving a component.
///
/// A model asking to end the simulation is not an error; it is reported as a
/// successful, early outcome by the step executor and the driving modes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid experiment: {0}")]
    Experiment(#[from] ExperimentError),

    #[error("could not allocate {buffer} buffer")]
    Allocation {
        buffer: Buffer,
        #[source]
        source: AllocError,
    },

    #[error("could not instantiate `{instance}`")]
    Instantiation { instance: String },

    #[error("{call} returned {status}")]
    Lifecycle { call: Call, status: Status },

    #[error("{call} returned {status} at t={time}")]
    Step { call: Call, status: Status, time: f64 },

    #[error("discrete states did not settle after {iters} iterations at t={time}")]
    NotSettled { iters: usize, time: f64 },
}

impl Error {
    /// Returns the status equivalent of this error.
    ///
    /// Component failures report the status the component returned; a failed
    /// instantiation is fatal; every other failure maps to [`Status::Error`].
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::Lifecycle { status, .. } | Self::Step { status, .. } => *status,
            Self::Instantiation { .. } => Status::Fatal,
            Self::Experiment(_) | Self::Allocation { .. } | Self::NotSettled { .. } => {
                Status::Error
            }
        }
    }
}

/// The phase a component call belongs to, which decides how failures surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Instantiation through the initial settling, and teardown.
    Lifecycle,

    /// A single invocation of the step executor.
    Step,
}

impl Phase {
    /// Checks a call's status against the severity threshold.
    ///
    /// Warnings pass and are logged; anything above a warning is an error.
    pub(crate) fn check(self, call: Call, status: Status, time: f64) -> Result<(), Error> {
        if status.is_failure() {
            return Err(match self {
                Self::Lifecycle => Error::Lifecycle { call, status },
                Self::Step => Error::Step { call, status, time },
            });
        }
        if status == Status::Warning {
            warn!(%call, time, "component returned a warning");
        }
        Ok(())
    }
}
