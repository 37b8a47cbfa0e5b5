use shuttle_core::{Allocator, Binding, Callbacks, Component, EventInfo, VariableDirectory};
use tracing::{debug, info, warn};

use crate::{
    Experiment, Recorder, Recording,
    error::{Buffer, Call, Error, Phase},
};

use super::{Counters, Grid, Handle, Mode, Simulation, settle::Settled};

/// Upper bound on the samples reserved per series before the run starts.
/// Series grow past it on demand.
const MAX_RESERVED_SAMPLES: usize = 1 << 16;

impl<C: Component> Simulation<C> {
    /// Creates a component instance and brings it to continuous-time mode.
    ///
    /// Uses [`Callbacks::default`], which logs through `tracing` and allocates
    /// from the global heap. See [`initialize_with`](Self::initialize_with).
    ///
    /// # Errors
    ///
    /// See [`initialize_with`](Self::initialize_with).
    pub fn initialize<B>(
        binding: &B,
        experiment: &Experiment,
        directory: VariableDirectory,
        recording: Recording,
    ) -> Result<Self, Error>
    where
        B: Binding<Component = C>,
    {
        Self::initialize_with(binding, experiment, directory, recording, Callbacks::default())
    }

    /// Creates a component instance and brings it to continuous-time mode.
    ///
    /// # Sequence
    ///
    /// 1. Instantiate the component; the callbacks are handed to it.
    /// 2. Allocate the state, derivative, and (when the component has event
    ///    indicators) the current and previous indicator buffers.
    /// 3. Turn on debug logging if the experiment asks for it.
    /// 4. Set up the experiment, enter and exit initialization mode.
    /// 5. Settle the discrete states.
    /// 6. Enter continuous-time mode, read the initial event indicators, and
    ///    record the initial sample.
    ///
    /// If the model asks to terminate while settling, the simulation is
    /// returned already terminated, without entering continuous-time mode.
    /// This is a successful outcome.
    ///
    /// # Errors
    ///
    /// Fails on the first problem, after releasing everything acquired so far:
    ///
    /// - [`Error::Experiment`] if the experiment is invalid
    /// - [`Error::Instantiation`] if the binding returns no instance
    /// - [`Error::Allocation`] if a working buffer cannot be allocated
    /// - [`Error::Lifecycle`] if a component call returns a status above warning
    /// - [`Error::NotSettled`] if the discrete states do not settle
    pub fn initialize_with<B>(
        binding: &B,
        experiment: &Experiment,
        directory: VariableDirectory,
        recording: Recording,
        callbacks: Callbacks,
    ) -> Result<Self, Error>
    where
        B: Binding<Component = C>,
    {
        experiment.validate()?;

        let instance = experiment.instance_name();
        let component = binding
            .instantiate(
                instance,
                binding.guid(),
                callbacks.clone(),
                experiment.visible(),
                experiment.logging_on(),
            )
            .ok_or_else(|| Error::Instantiation {
                instance: instance.to_string(),
            })?;
        let component = Handle::new(component);
        debug!(instance, "instantiated");

        let nx = component.number_of_continuous_states();
        let nz = component.number_of_event_indicators();

        // Dropping `component` on any failure below frees the instance.
        let allocator = &*callbacks.allocator;
        let x = allocate(allocator, Buffer::States, nx)?;
        let xdot = allocate(allocator, Buffer::Derivatives, nx)?;
        let (z, prez) = if nz > 0 {
            (
                allocate(allocator, Buffer::EventIndicators, nz)?,
                allocate(allocator, Buffer::PreviousEventIndicators, nz)?,
            )
        } else {
            (Vec::new(), Vec::new())
        };

        let mut recorder = Recorder::new(recording, directory.len());
        if recording == Recording::Series {
            let samples = experiment
                .grid_steps()
                .saturating_add(1)
                .min(MAX_RESERVED_SAMPLES);
            recorder.reserve(samples).map_err(|source| {
                warn!(samples, "series allocation failed");
                Error::Allocation {
                    buffer: Buffer::Series,
                    source,
                }
            })?;
        }

        let mut simulation = Self {
            component,
            mode: Mode::Instantiated,
            nx,
            nz,
            x,
            xdot,
            z,
            prez,
            start_time: experiment.start_time(),
            time: experiment.start_time(),
            step_size: experiment.step_size(),
            stop_time: experiment.stop_time(),
            grid: Grid::new(experiment.start_time()),
            event_info: EventInfo::default(),
            directory,
            recorder,
            counters: Counters::default(),
            terminated: false,
            fault: None,
            pending: None,
            max_settle_iters: experiment.max_settle_iters(),
        };
        simulation.start(experiment)?;

        Ok(simulation)
    }

    /// Runs the instantiated component up to continuous-time mode.
    fn start(&mut self, experiment: &Experiment) -> Result<(), Error> {
        let phase = Phase::Lifecycle;

        if experiment.logging_on() {
            let status = self
                .component
                .set_debug_logging(true, experiment.debug_categories());
            phase.check(Call::SetDebugLogging, status, self.time)?;
        }

        let status = self.component.setup_experiment(
            experiment.tolerance(),
            self.start_time,
            Some(self.stop_time),
        );
        phase.check(Call::SetupExperiment, status, self.time)?;

        let status = self.component.enter_initialization_mode();
        phase.check(Call::EnterInitializationMode, status, self.time)?;
        self.mode = Mode::InitializationMode;

        let status = self.component.exit_initialization_mode();
        phase.check(Call::ExitInitializationMode, status, self.time)?;
        self.mode = Mode::EventMode;
        debug!(time = self.time, "initialization done");

        if let Settled::Terminated = self.settle(phase)? {
            return Ok(());
        }

        let status = self.component.enter_continuous_time_mode();
        phase.check(Call::EnterContinuousTimeMode, status, self.time)?;
        self.mode = Mode::ContinuousTime;

        if self.nz > 0 {
            let status = self.component.get_event_indicators(&mut self.z);
            phase.check(Call::GetEventIndicators, status, self.time)?;
        }

        self.recorder
            .sample(&mut *self.component, &self.directory, self.time, phase)?;

        info!(
            nx = self.nx,
            nz = self.nz,
            start = self.start_time,
            stop = self.stop_time,
            step_size = self.step_size,
            "simulation ready"
        );
        Ok(())
    }
}

fn allocate(allocator: &dyn Allocator, buffer: Buffer, len: usize) -> Result<Vec<f64>, Error> {
    allocator.allocate(len).map_err(|source| {
        warn!(%buffer, len, "buffer allocation failed");
        Error::Allocation { buffer, source }
    })
}
