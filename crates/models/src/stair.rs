//! A counter that climbs one step per period.
//!
//! The stair has no continuous states and no event indicators. It schedules a
//! time event every `period` seconds and increments its integer `counter` when
//! the event is handled. With a `limit`, reaching it asks the driver to end the
//! simulation.

use shuttle_core::{
    Binding, Callbacks, Component, EventInfo, Status, StepOutcome, ValueReference, Variable,
    VariableDirectory,
};

use crate::log::{EVENTS, Log};

pub const GUID: &str = "{c3d2f5a6-1b7e-4f09-9a2c-5e8d7b3f6a14}";

const TIME: u32 = 0;
const COUNTER: u32 = 1;

/// Creates [`Stair`] instances.
#[derive(Debug, Clone, Copy)]
pub struct StairBinding {
    period: f64,
    limit: Option<i32>,
}

impl StairBinding {
    #[must_use]
    pub fn new(period: f64) -> Self {
        Self {
            period,
            limit: None,
        }
    }

    /// Requests termination once the counter reaches `limit`.
    #[must_use]
    pub fn with_limit(self, limit: i32) -> Self {
        Self {
            limit: Some(limit),
            ..self
        }
    }

    #[must_use]
    pub fn directory(&self) -> VariableDirectory {
        VariableDirectory::new(vec![
            Variable::real("time", TIME),
            Variable::integer("counter", COUNTER),
        ])
    }
}

impl Default for StairBinding {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Binding for StairBinding {
    type Component = Stair;

    fn guid(&self) -> &str {
        GUID
    }

    fn instantiate(
        &self,
        instance_name: &str,
        guid: &str,
        callbacks: Callbacks,
        _visible: bool,
        logging_on: bool,
    ) -> Option<Stair> {
        let log = Log::new(instance_name, &callbacks, logging_on);
        if guid != GUID {
            log.fail(Status::Error, || format!("unknown GUID {guid}"));
            return None;
        }
        if !(self.period.is_finite() && self.period > 0.0) {
            log.fail(Status::Error, || format!("invalid period {}", self.period));
            return None;
        }
        Some(Stair {
            log,
            period: self.period,
            limit: self.limit,
            time: 0.0,
            next_step: self.period,
            counter: 0,
        })
    }
}

/// One stair instance.
pub struct Stair {
    log: Log,
    period: f64,
    limit: Option<i32>,
    time: f64,
    next_step: f64,
    counter: i32,
}

impl Stair {
    fn empty(&self, what: &str, len: usize) -> Status {
        if len == 0 {
            Status::Ok
        } else {
            self.log
                .fail(Status::Error, || format!("expected no {what}, got {len}"))
        }
    }
}

impl Component for Stair {
    fn number_of_continuous_states(&self) -> usize {
        0
    }

    fn number_of_event_indicators(&self) -> usize {
        0
    }

    fn set_debug_logging(&mut self, logging_on: bool, categories: &[String]) -> Status {
        self.log.configure(logging_on, categories);
        Status::Ok
    }

    fn setup_experiment(
        &mut self,
        _tolerance: Option<f64>,
        start_time: f64,
        _stop_time: Option<f64>,
    ) -> Status {
        self.time = start_time;
        self.next_step = start_time + self.period;
        Status::Ok
    }

    fn enter_initialization_mode(&mut self) -> Status {
        Status::Ok
    }

    fn exit_initialization_mode(&mut self) -> Status {
        Status::Ok
    }

    fn new_discrete_states(&mut self, event_info: &mut EventInfo) -> Status {
        if self.time >= self.next_step {
            self.counter += 1;
            self.next_step += self.period;
            self.log.emit(Status::Ok, EVENTS, || {
                format!("counter {} at t={}", self.counter, self.time)
            });
        }

        let done = self.limit.is_some_and(|limit| self.counter >= limit);
        if done {
            self.log.emit(Status::Ok, EVENTS, || {
                format!("limit reached at t={}", self.time)
            });
        }

        event_info.new_discrete_states_needed = false;
        event_info.terminate_simulation = done;
        event_info.values_of_continuous_states_changed = false;
        event_info.nominals_of_continuous_states_changed = false;
        event_info.schedule(self.next_step);
        Status::Ok
    }

    fn enter_continuous_time_mode(&mut self) -> Status {
        Status::Ok
    }

    fn enter_event_mode(&mut self) -> Status {
        Status::Ok
    }

    fn get_continuous_states(&mut self, states: &mut [f64]) -> Status {
        self.empty("states", states.len())
    }

    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> Status {
        self.empty("derivatives", derivatives.len())
    }

    fn set_continuous_states(&mut self, states: &[f64]) -> Status {
        self.empty("states", states.len())
    }

    fn set_time(&mut self, time: f64) -> Status {
        self.time = time;
        if time > self.next_step {
            return self.log.fail(Status::Warning, || {
                format!("time {time} skipped the step at {}", self.next_step)
            });
        }
        Status::Ok
    }

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> Status {
        self.empty("event indicators", indicators.len())
    }

    fn completed_integrator_step(
        &mut self,
        _no_set_state_prior: bool,
        outcome: &mut StepOutcome,
    ) -> Status {
        *outcome = StepOutcome::default();
        Status::Ok
    }

    fn get_real(&mut self, references: &[ValueReference], values: &mut [f64]) -> Status {
        for (value, reference) in values.iter_mut().zip(references) {
            if reference.0 != TIME {
                return self
                    .log
                    .fail(Status::Error, || format!("no real variable {reference}"));
            }
            *value = self.time;
        }
        Status::Ok
    }

    fn get_integer(&mut self, references: &[ValueReference], values: &mut [i32]) -> Status {
        for (value, reference) in values.iter_mut().zip(references) {
            if reference.0 != COUNTER {
                return self
                    .log
                    .fail(Status::Error, || format!("no integer variable {reference}"));
            }
            *value = self.counter;
        }
        Status::Ok
    }

    fn terminate(&mut self) -> Status {
        Status::Ok
    }

    fn free_instance(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stair(binding: StairBinding) -> Stair {
        let mut stair = binding
            .instantiate("stair", GUID, Callbacks::default(), false, false)
            .expect("valid binding");
        stair.setup_experiment(None, 0.0, None);
        stair
    }

    fn counter(stair: &mut Stair) -> i32 {
        let mut value = [0];
        assert_eq!(
            stair.get_integer(&[ValueReference(COUNTER)], &mut value),
            Status::Ok
        );
        value[0]
    }

    #[test]
    fn schedules_the_first_step_while_initializing() {
        let mut stair = stair(StairBinding::new(0.5));
        let mut info = EventInfo::default();

        stair.new_discrete_states(&mut info);

        assert_eq!(info.next_event_time(), Some(0.5));
        assert_eq!(counter(&mut stair), 0);
    }

    #[test]
    fn climbs_at_each_scheduled_time() {
        let mut stair = stair(StairBinding::new(0.5));
        let mut info = EventInfo::default();

        for time in [0.5, 1.0] {
            stair.set_time(time);
            stair.new_discrete_states(&mut info);
        }

        assert_eq!(counter(&mut stair), 2);
        assert_eq!(info.next_event_time(), Some(1.5));
        assert!(!info.terminate_simulation);
    }

    #[test]
    fn limit_requests_termination() {
        let mut stair = stair(StairBinding::new(1.0).with_limit(1));
        let mut info = EventInfo::default();

        stair.set_time(1.0);
        stair.new_discrete_states(&mut info);

        assert!(info.terminate_simulation);
    }

    #[test]
    fn skipping_a_step_warns() {
        let mut stair = stair(StairBinding::new(1.0));

        assert_eq!(stair.set_time(1.5), Status::Warning);
    }

    #[test]
    fn invalid_period_refuses_instantiation() {
        let stair =
            StairBinding::new(0.0).instantiate("stair", GUID, Callbacks::default(), false, false);

        assert!(stair.is_none());
    }

    #[test]
    fn states_must_be_empty() {
        let mut stair = stair(StairBinding::default());

        assert_eq!(stair.get_continuous_states(&mut []), Status::Ok);
        assert_eq!(stair.set_continuous_states(&[1.0]), Status::Error);
    }
}
