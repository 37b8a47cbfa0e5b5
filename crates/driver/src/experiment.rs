use thiserror::Error;

/// How a simulation run is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DriveMode {
    /// Run to completion and return a summary.
    #[default]
    Batch,

    /// Hand out one committed step per pull.
    Incremental,
}

/// Configuration of a single simulation run.
///
/// Built with [`Experiment::new`] and refined with the `with_*` methods, each
/// of which validates its input. An experiment obtained some other way (for
/// example by deserialization) is validated again when a run starts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Experiment {
    start_time: f64,
    stop_time: f64,
    step_size: f64,
    tolerance: Option<f64>,
    instance_name: String,
    visible: bool,
    logging_on: bool,
    debug_categories: Vec<String>,
    max_settle_iters: usize,
}

/// Errors that can occur when validating an experiment.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentError {
    #[error("start and stop times must be finite")]
    NonFiniteTime,

    #[error("stop time must not precede start time")]
    StopBeforeStart,

    #[error("step size must be finite and positive")]
    StepSize,

    #[error("tolerance must be finite and positive")]
    Tolerance,

    #[error("max_settle_iters must be at least 1")]
    SettleIters,
}

impl Default for Experiment {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            stop_time: 1.0,
            step_size: 1e-3,
            tolerance: None,
            instance_name: "instance".to_string(),
            visible: false,
            logging_on: false,
            debug_categories: Vec::new(),
            max_settle_iters: 1000,
        }
    }
}

impl Experiment {
    /// Creates an experiment over `[start_time, stop_time]` with a fixed step.
    ///
    /// # Errors
    ///
    /// Returns an error if a time is non-finite, the interval is reversed, or
    /// the step size is not positive.
    pub fn new(start_time: f64, stop_time: f64, step_size: f64) -> Result<Self, ExperimentError> {
        let experiment = Self {
            start_time,
            stop_time,
            step_size,
            ..Self::default()
        };
        experiment.validate()?;
        Ok(experiment)
    }

    /// Sets the tolerance passed to the component's experiment setup.
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerance is not finite and positive.
    pub fn with_tolerance(self, tolerance: f64) -> Result<Self, ExperimentError> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(ExperimentError::Tolerance);
        }
        Ok(Self {
            tolerance: Some(tolerance),
            ..self
        })
    }

    /// Bounds the number of discrete-state updates in one settling loop.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_settle_iters` is zero.
    pub fn with_max_settle_iters(self, max_settle_iters: usize) -> Result<Self, ExperimentError> {
        if max_settle_iters == 0 {
            return Err(ExperimentError::SettleIters);
        }
        Ok(Self {
            max_settle_iters,
            ..self
        })
    }

    #[must_use]
    pub fn with_instance_name(self, instance_name: impl Into<String>) -> Self {
        Self {
            instance_name: instance_name.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_visible(self, visible: bool) -> Self {
        Self { visible, ..self }
    }

    /// Turns on component debug logging for the given categories.
    ///
    /// An empty list asks the component to log every category.
    #[must_use]
    pub fn with_logging<I, S>(self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            logging_on: true,
            debug_categories: categories.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ExperimentError> {
        if !self.start_time.is_finite() || !self.stop_time.is_finite() {
            return Err(ExperimentError::NonFiniteTime);
        }
        if self.stop_time < self.start_time {
            return Err(ExperimentError::StopBeforeStart);
        }
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(ExperimentError::StepSize);
        }
        if self
            .tolerance
            .is_some_and(|tolerance| !tolerance.is_finite() || tolerance <= 0.0)
        {
            return Err(ExperimentError::Tolerance);
        }
        if self.max_settle_iters == 0 {
            return Err(ExperimentError::SettleIters);
        }
        Ok(())
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
    pub fn tolerance(&self) -> Option<f64> {
        self.tolerance
    }

    #[must_use]
    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn logging_on(&self) -> bool {
        self.logging_on
    }

    #[must_use]
    pub fn debug_categories(&self) -> &[String] {
        &self.debug_categories
    }

    #[must_use]
    pub fn max_settle_iters(&self) -> usize {
        self.max_settle_iters
    }

    /// Returns the number of steps needed to cross the interval on an
    /// unbroken grid: `⌈(stop − start) / h⌉`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn grid_steps(&self) -> usize {
        ((self.stop_time - self.start_time) / self.step_size).ceil() as usize
    }
}
