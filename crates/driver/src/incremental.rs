//! Incremental driving: hand out one sample per committed step.
//!
//! A [`Stepper`] owns an initialized simulation and advances it only when the
//! caller pulls. Between pulls nothing runs, so a host can interleave the
//! simulation with its own work or stop consuming at any point. Abandoning a
//! stepper still frees the component instance.

use shuttle_core::{Binding, Component, Status, VariableDirectory};
use tracing::{debug, info};

use crate::{Error, Experiment, Recording, Simulation, Step};

/// The tracked values after one committed step.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// The step count after this step (1 for the first step).
    pub step: usize,

    pub time: f64,

    /// One value per tracked directory slot, in directory order.
    ///
    /// The reserved leading slot is not repeated here; it is [`Sample::time`].
    pub values: Vec<f64>,
}

/// The result of one pull.
#[derive(Debug, Clone, PartialEq)]
pub enum Pull {
    /// A step was committed.
    Value(Sample),

    /// There is nothing left to produce.
    Done,
}

impl Pull {
    /// Returns the status equivalent of this pull.
    ///
    /// [`Pull::Done`] maps to [`Status::Discard`].
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::Value(_) => Status::Ok,
            Self::Done => Status::Discard,
        }
    }
}

/// Advances a simulation one step per pull.
pub struct Stepper<C: Component> {
    simulation: Simulation<C>,
    exhausted: bool,
}

impl<C: Component> Stepper<C> {
    /// Initializes a component and returns a stepper positioned at the start.
    ///
    /// # Errors
    ///
    /// Returns any failure from initialization. The instance is freed.
    pub fn start<B>(
        binding: &B,
        experiment: &Experiment,
        directory: VariableDirectory,
    ) -> Result<Self, Error>
    where
        B: Binding<Component = C>,
    {
        let simulation =
            Simulation::initialize(binding, experiment, directory, Recording::Latest)?;
        debug!(
            start_time = simulation.start_time(),
            stop_time = simulation.stop_time(),
            "stepper ready"
        );
        Ok(Self {
            simulation,
            exhausted: false,
        })
    }

    /// Advances by one step and returns its sample.
    ///
    /// Returns [`Pull::Done`] once the stop time is reached or the model has
    /// asked to end the simulation, and keeps returning it after that.
    ///
    /// # Errors
    ///
    /// Returns any failure from the step. The simulation is left as it was at
    /// the failure and may be pulled again.
    pub fn pull(&mut self) -> Result<Pull, Error> {
        if self.exhausted {
            return Ok(Pull::Done);
        }

        match self.simulation.step()? {
            Step::Advanced(report) => {
                let latest = self.simulation.recorder().latest();
                Ok(Pull::Value(Sample {
                    step: report.step,
                    time: report.time,
                    values: latest.get(1..).unwrap_or_default().to_vec(),
                }))
            }
            Step::Terminated { .. } | Step::Idle => {
                self.exhausted = true;
                Ok(Pull::Done)
            }
        }
    }

    /// Returns the underlying simulation for inspection.
    #[must_use]
    pub fn simulation(&self) -> &Simulation<C> {
        &self.simulation
    }

    /// Tears the simulation down and frees the instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] if the component fails to terminate. The
    /// instance is freed regardless.
    pub fn close(self) -> Result<(), Error> {
        let counters = self.simulation.counters();
        info!(
            time = self.simulation.time(),
            steps = counters.steps,
            "stepper closed"
        );
        self.simulation.teardown()
    }
}

/// Yields one sample per committed step and stops after the last one or after
/// the first error.
impl<C: Component> Iterator for Stepper<C> {
    type Item = Result<Sample, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.pull() {
            Ok(Pull::Value(sample)) => Some(Ok(sample)),
            Ok(Pull::Done) => None,
            Err(err) => {
                self.exhausted = true;
                Some(Err(err))
            }
        }
    }
}

impl<C: Component> std::iter::FusedIterator for Stepper<C> {}
