use crate::Counters;

/// Indicates how a batch run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// Reached the stop time.
    Complete,

    /// The model asked to end the simulation.
    Terminated,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// The recorded values of one directory slot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Series {
    pub name: String,

    /// One value per sample, starting with the initial sample.
    ///
    /// Empty for variables without a numeric accessor.
    pub values: Vec<f64>,
}

/// The result of a batch run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    pub status: Status,
    pub start_time: f64,
    pub stop_time: f64,

    /// The last committed time.
    pub final_time: f64,

    pub step_size: f64,
    pub steps: usize,
    pub time_events: usize,
    pub state_events: usize,
    pub step_events: usize,

    /// Whether the model asked to end the simulation.
    pub terminated: bool,

    /// One series per directory slot, in directory order.
    pub series: Vec<Series>,
}

impl Summary {
    /// Returns the series recorded for the variable called `name`.
    #[must_use]
    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|series| series.name == name)
            .map(|series| series.values.as_slice())
    }

    pub(super) fn counters(&self) -> Counters {
        Counters {
            steps: self.steps,
            time_events: self.time_events,
            state_events: self.state_events,
            step_events: self.step_events,
        }
    }
}
