//! A scriptable component for exercising the driver.
//!
//! [`Probe`] integrates constant rates, derives its event indicators from its
//! first state (or from time when it has no states), optionally schedules
//! periodic time events, and can be told to signal step events, request
//! termination, or fail any call on its n-th invocation. Every call is written
//! to a shared [`Ledger`] so tests can assert on what the driver did.

use std::{
    cell::{Ref, RefCell},
    collections::HashMap,
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};

use shuttle_core::{
    AllocError, Allocator, Binding, Callbacks, Component, EventInfo, Status, StepOutcome,
    SystemAllocator, ValueReference, Variable, VariableDirectory,
};

use crate::error::Call;

pub(crate) const PROBE_GUID: &str = "{probe}";

/// Value reference of the integer counter of discrete-state updates.
pub(crate) const TICKS: u32 = 100;

/// Everything the driver did to probes created by one binding.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    pub(crate) calls: Vec<Call>,
    pub(crate) instantiated: usize,
    pub(crate) freed: usize,
}

impl Ledger {
    pub(crate) fn count(&self, call: Call) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

#[derive(Debug, Clone, Default)]
struct Script {
    states: Vec<f64>,
    rates: Vec<f64>,
    thresholds: Vec<f64>,
    event_period: Option<f64>,
    step_events_at: Vec<usize>,
    terminate_on_step: Option<usize>,
    terminate_on_update: Option<usize>,
    endless_updates: bool,
    failures: Vec<(Call, usize, Status)>,
    refuse: bool,
}

pub(crate) struct ProbeBuilder {
    script: Script,
}

impl ProbeBuilder {
    pub(crate) fn states(mut self, states: &[f64]) -> Self {
        self.script.states = states.to_vec();
        self
    }

    pub(crate) fn rates(mut self, rates: &[f64]) -> Self {
        self.script.rates = rates.to_vec();
        self
    }

    /// Adds one event indicator per threshold: `x0 - threshold` (or `t - threshold`).
    pub(crate) fn thresholds(mut self, thresholds: &[f64]) -> Self {
        self.script.thresholds = thresholds.to_vec();
        self
    }

    pub(crate) fn event_period(mut self, period: f64) -> Self {
        self.script.event_period = Some(period);
        self
    }

    /// Signals a step event on the given (1-based) completed integrator steps.
    pub(crate) fn step_events_at(mut self, steps: &[usize]) -> Self {
        self.script.step_events_at = steps.to_vec();
        self
    }

    pub(crate) fn terminate_on_step(mut self, step: usize) -> Self {
        self.script.terminate_on_step = Some(step);
        self
    }

    pub(crate) fn terminate_on_update(mut self, update: usize) -> Self {
        self.script.terminate_on_update = Some(update);
        self
    }

    pub(crate) fn endless_updates(mut self) -> Self {
        self.script.endless_updates = true;
        self
    }

    /// Makes the `nth` (1-based) invocation of `call` return `status`.
    pub(crate) fn fail(mut self, call: Call, nth: usize, status: Status) -> Self {
        self.script.failures.push((call, nth, status));
        self
    }

    pub(crate) fn refuse(mut self) -> Self {
        self.script.refuse = true;
        self
    }

    pub(crate) fn build(mut self) -> ProbeBinding {
        self.script.rates.resize(self.script.states.len(), 0.0);
        ProbeBinding {
            script: self.script,
            ledger: Rc::default(),
        }
    }
}

pub(crate) struct ProbeBinding {
    script: Script,
    ledger: Rc<RefCell<Ledger>>,
}

impl ProbeBinding {
    pub(crate) fn builder() -> ProbeBuilder {
        ProbeBuilder {
            script: Script::default(),
        }
    }

    pub(crate) fn ledger(&self) -> Ref<'_, Ledger> {
        self.ledger.borrow()
    }

    /// Creates a probe directly, bypassing the driver.
    pub(crate) fn instance(&self) -> Probe {
        Probe::new(self.script.clone(), Rc::clone(&self.ledger))
    }

    /// Returns a directory with `time`, every state, and the update counter.
    pub(crate) fn directory(&self) -> VariableDirectory {
        let states = (0..self.script.states.len()).map(|i| {
            let reference = u32::try_from(i + 1).unwrap();
            Variable::real(format!("x{i}"), reference)
        });
        std::iter::once(Variable::real("time", 0))
            .chain(states)
            .chain(std::iter::once(Variable::integer("ticks", TICKS)))
            .collect()
    }
}

impl Binding for ProbeBinding {
    type Component = Probe;

    fn guid(&self) -> &str {
        PROBE_GUID
    }

    fn instantiate(
        &self,
        _instance_name: &str,
        guid: &str,
        _callbacks: Callbacks,
        _visible: bool,
        _logging_on: bool,
    ) -> Option<Probe> {
        if self.script.refuse || guid != PROBE_GUID {
            return None;
        }
        self.ledger.borrow_mut().instantiated += 1;
        Some(self.instance())
    }
}

pub(crate) struct Probe {
    script: Script,
    ledger: Rc<RefCell<Ledger>>,
    counts: HashMap<Call, usize>,
    time: f64,
    x: Vec<f64>,
    next_event: f64,
    updates: usize,
    completed_steps: usize,
    ticks: i32,
}

impl Probe {
    fn new(script: Script, ledger: Rc<RefCell<Ledger>>) -> Self {
        let x = script.states.clone();
        let next_event = script.event_period.unwrap_or(f64::INFINITY);
        Self {
            script,
            ledger,
            counts: HashMap::new(),
            time: 0.0,
            x,
            next_event,
            updates: 0,
            completed_steps: 0,
            ticks: 0,
        }
    }

    pub(crate) fn set_ticks(&mut self, ticks: i32) {
        self.ticks = ticks;
    }

    fn hit(&mut self, call: Call) -> Status {
        self.ledger.borrow_mut().calls.push(call);
        let count = self.counts.entry(call).or_insert(0);
        *count += 1;
        let count = *count;
        self.script
            .failures
            .iter()
            .find(|(c, nth, _)| *c == call && *nth == count)
            .map_or(Status::Ok, |(_, _, status)| *status)
    }

    fn indicator_source(&self) -> f64 {
        self.x.first().copied().unwrap_or(self.time)
    }
}

impl Component for Probe {
    fn number_of_continuous_states(&self) -> usize {
        self.x.len()
    }

    fn number_of_event_indicators(&self) -> usize {
        self.script.thresholds.len()
    }

    fn set_debug_logging(&mut self, _logging_on: bool, _categories: &[String]) -> Status {
        self.hit(Call::SetDebugLogging)
    }

    fn setup_experiment(
        &mut self,
        _tolerance: Option<f64>,
        start_time: f64,
        _stop_time: Option<f64>,
    ) -> Status {
        let status = self.hit(Call::SetupExperiment);
        self.time = start_time;
        if let Some(period) = self.script.event_period {
            self.next_event = start_time + period;
        }
        status
    }

    fn enter_initialization_mode(&mut self) -> Status {
        self.hit(Call::EnterInitializationMode)
    }

    fn exit_initialization_mode(&mut self) -> Status {
        self.hit(Call::ExitInitializationMode)
    }

    fn new_discrete_states(&mut self, event_info: &mut EventInfo) -> Status {
        let status = self.hit(Call::NewDiscreteStates);
        if status.is_failure() {
            return status;
        }
        self.updates += 1;
        self.ticks += 1;

        if let Some(period) = self.script.event_period {
            while self.next_event <= self.time {
                self.next_event += period;
            }
            event_info.schedule(self.next_event);
        } else {
            event_info.unschedule();
        }
        event_info.new_discrete_states_needed = self.script.endless_updates;
        event_info.terminate_simulation = self.script.terminate_on_update == Some(self.updates);
        event_info.values_of_continuous_states_changed = false;
        event_info.nominals_of_continuous_states_changed = false;
        status
    }

    fn enter_continuous_time_mode(&mut self) -> Status {
        self.hit(Call::EnterContinuousTimeMode)
    }

    fn enter_event_mode(&mut self) -> Status {
        self.hit(Call::EnterEventMode)
    }

    fn get_continuous_states(&mut self, states: &mut [f64]) -> Status {
        let status = self.hit(Call::GetContinuousStates);
        states.copy_from_slice(&self.x);
        status
    }

    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> Status {
        let status = self.hit(Call::GetDerivatives);
        derivatives.copy_from_slice(&self.script.rates);
        status
    }

    fn set_continuous_states(&mut self, states: &[f64]) -> Status {
        let status = self.hit(Call::SetContinuousStates);
        if !status.is_failure() {
            self.x.copy_from_slice(states);
        }
        status
    }

    fn set_time(&mut self, time: f64) -> Status {
        let status = self.hit(Call::SetTime);
        if !status.is_failure() {
            self.time = time;
        }
        status
    }

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> Status {
        let status = self.hit(Call::GetEventIndicators);
        let source = self.indicator_source();
        for (indicator, threshold) in indicators.iter_mut().zip(&self.script.thresholds) {
            *indicator = source - threshold;
        }
        status
    }

    fn completed_integrator_step(
        &mut self,
        _no_set_state_prior: bool,
        outcome: &mut StepOutcome,
    ) -> Status {
        let status = self.hit(Call::CompletedIntegratorStep);
        if status.is_failure() {
            return status;
        }
        self.completed_steps += 1;
        outcome.enter_event_mode = self.script.step_events_at.contains(&self.completed_steps);
        outcome.terminate_simulation = self.script.terminate_on_step == Some(self.completed_steps);
        status
    }

    fn get_real(&mut self, references: &[ValueReference], values: &mut [f64]) -> Status {
        let status = self.hit(Call::GetReal);
        for (value, reference) in values.iter_mut().zip(references) {
            let index = reference.0 as usize;
            *value = match index {
                0 => self.time,
                i if i <= self.x.len() => self.x[i - 1],
                _ => 0.0,
            };
        }
        status
    }

    fn get_integer(&mut self, references: &[ValueReference], values: &mut [i32]) -> Status {
        let status = self.hit(Call::GetInteger);
        for (value, reference) in values.iter_mut().zip(references) {
            *value = if reference.0 == TICKS { self.ticks } else { 0 };
        }
        status
    }

    fn terminate(&mut self) -> Status {
        self.hit(Call::Terminate)
    }

    fn free_instance(&mut self) {
        self.ledger.borrow_mut().freed += 1;
    }
}

/// Fails the `fail_on`-th (1-based) allocation and delegates the rest.
#[derive(Debug)]
pub(crate) struct FailingAllocator {
    fail_on: usize,
    calls: AtomicUsize,
}

impl FailingAllocator {
    pub(crate) fn new(fail_on: usize) -> Self {
        Self {
            fail_on,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Allocator for FailingAllocator {
    fn allocate(&self, len: usize) -> Result<Vec<f64>, AllocError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(AllocError { len });
        }
        SystemAllocator.allocate(len)
    }
}
