//! A ball dropped onto a rigid floor.
//!
//! The ball has two continuous states, height `h` and velocity `v`, with
//! `der(h) = v` and `der(v) = -g`. Its single event indicator is the height,
//! so the driver raises a state event when the ball passes through the floor.
//! The bounce itself happens in the discrete-state update: the ball is put
//! back just above the floor and its velocity is reversed and scaled by the
//! coefficient of restitution. Once a bounce leaves less than `min_velocity`
//! the ball comes to rest and the indicator is held at `1`.

use shuttle_core::{
    Binding, Callbacks, Component, EventInfo, Status, StepOutcome, ValueReference, Variable,
    VariableDirectory,
};

use crate::log::{EVENTS, Log};

pub const GUID: &str = "{8c4e810f-3df3-4a00-8276-176fa3c9f003}";

const TIME: u32 = 0;
const HEIGHT: u32 = 1;
const HEIGHT_RATE: u32 = 2;
const VELOCITY: u32 = 3;
const VELOCITY_RATE: u32 = 4;
const GRAVITY: u32 = 5;
const RESTITUTION: u32 = 6;
const BOUNCES: u32 = 7;

/// Initial conditions and physical constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub height: f64,
    pub velocity: f64,
    pub gravity: f64,
    pub restitution: f64,

    /// Rebound speed below which the ball comes to rest.
    pub min_velocity: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            height: 1.0,
            velocity: 0.0,
            gravity: 9.81,
            restitution: 0.7,
            min_velocity: 0.1,
        }
    }
}

/// Creates [`BouncingBall`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct BouncingBallBinding {
    parameters: Parameters,
}

impl BouncingBallBinding {
    #[must_use]
    pub fn new(parameters: Parameters) -> Self {
        Self { parameters }
    }

    /// Returns the variables a driver should track, with time in slot 0.
    #[must_use]
    pub fn directory(&self) -> VariableDirectory {
        VariableDirectory::new(vec![
            Variable::real("time", TIME),
            Variable::real("h", HEIGHT),
            Variable::real("der(h)", HEIGHT_RATE),
            Variable::real("v", VELOCITY),
            Variable::real("der(v)", VELOCITY_RATE),
            Variable::real("g", GRAVITY),
            Variable::real("e", RESTITUTION),
            Variable::integer("bounces", BOUNCES),
        ])
    }
}

impl Binding for BouncingBallBinding {
    type Component = BouncingBall;

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
    ) -> Option<BouncingBall> {
        let log = Log::new(instance_name, &callbacks, logging_on);
        if guid != GUID {
            log.fail(Status::Error, || format!("unknown GUID {guid}"));
            return None;
        }
        Some(BouncingBall::new(self.parameters, log))
    }
}

/// One bouncing ball instance.
pub struct BouncingBall {
    log: Log,
    parameters: Parameters,
    time: f64,
    h: f64,
    v: f64,
    bounces: i32,
    resting: bool,
    terminated: bool,
}

impl BouncingBall {
    fn new(parameters: Parameters, log: Log) -> Self {
        Self {
            log,
            parameters,
            time: 0.0,
            h: parameters.height,
            v: parameters.velocity,
            bounces: 0,
            resting: false,
            terminated: false,
        }
    }

    /// Rejects calls after `terminate`.
    fn usable(&self, call: &str) -> Status {
        if self.terminated {
            self.log
                .fail(Status::Error, || format!("{call} called after terminate"));
            return Status::Error;
        }
        Status::Ok
    }

    fn rates(&self) -> (f64, f64) {
        if self.resting {
            (0.0, 0.0)
        } else {
            (self.v, -self.parameters.gravity)
        }
    }

    fn bounce(&mut self) {
        let rebound = -self.parameters.restitution * self.v;
        self.bounces += 1;

        if rebound < self.parameters.min_velocity {
            self.resting = true;
            self.h = 0.0;
            self.v = 0.0;
            self.log.emit(Status::Ok, EVENTS, || {
                format!("ball came to rest at t={}", self.time)
            });
        } else {
            self.h = f64::MIN_POSITIVE;
            self.v = rebound;
            self.log.emit(Status::Ok, EVENTS, || {
                format!("bounce {} at t={}, v={rebound}", self.bounces, self.time)
            });
        }
    }
}

impl Component for BouncingBall {
    fn number_of_continuous_states(&self) -> usize {
        2
    }

    fn number_of_event_indicators(&self) -> usize {
        1
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
        self.usable("setup_experiment")
    }

    fn enter_initialization_mode(&mut self) -> Status {
        self.usable("enter_initialization_mode")
    }

    fn exit_initialization_mode(&mut self) -> Status {
        if self.parameters.gravity <= 0.0 || !(0.0..=1.0).contains(&self.parameters.restitution)
        {
            return self.log.fail(Status::Error, || {
                format!(
                    "invalid parameters g={} e={}",
                    self.parameters.gravity, self.parameters.restitution
                )
            });
        }
        self.usable("exit_initialization_mode")
    }

    fn new_discrete_states(&mut self, event_info: &mut EventInfo) -> Status {
        let status = self.usable("new_discrete_states");
        if status.is_failure() {
            return status;
        }

        let hit_floor = !self.resting && self.h <= 0.0 && self.v < 0.0;
        if hit_floor {
            self.bounce();
        }

        event_info.new_discrete_states_needed = false;
        event_info.terminate_simulation = false;
        event_info.values_of_continuous_states_changed = hit_floor;
        event_info.nominals_of_continuous_states_changed = false;
        event_info.unschedule();
        Status::Ok
    }

    fn enter_continuous_time_mode(&mut self) -> Status {
        self.usable("enter_continuous_time_mode")
    }

    fn enter_event_mode(&mut self) -> Status {
        self.usable("enter_event_mode")
    }

    fn get_continuous_states(&mut self, states: &mut [f64]) -> Status {
        if states.len() != 2 {
            return self.log.fail(Status::Error, || {
                format!("expected 2 states, got {}", states.len())
            });
        }
        states.copy_from_slice(&[self.h, self.v]);
        self.usable("get_continuous_states")
    }

    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> Status {
        if derivatives.len() != 2 {
            return self.log.fail(Status::Error, || {
                format!("expected 2 derivatives, got {}", derivatives.len())
            });
        }
        let (h_rate, v_rate) = self.rates();
        derivatives.copy_from_slice(&[h_rate, v_rate]);
        self.usable("get_derivatives")
    }

    fn set_continuous_states(&mut self, states: &[f64]) -> Status {
        let &[h, v] = states else {
            return self.log.fail(Status::Error, || {
                format!("expected 2 states, got {}", states.len())
            });
        };
        if !self.resting {
            self.h = h;
            self.v = v;
        }
        self.usable("set_continuous_states")
    }

    fn set_time(&mut self, time: f64) -> Status {
        self.time = time;
        self.usable("set_time")
    }

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> Status {
        if indicators.len() != 1 {
            return self.log.fail(Status::Error, || {
                format!("expected 1 event indicator, got {}", indicators.len())
            });
        }
        indicators[0] = if self.resting { 1.0 } else { self.h };
        self.usable("get_event_indicators")
    }

    fn completed_integrator_step(
        &mut self,
        _no_set_state_prior: bool,
        outcome: &mut StepOutcome,
    ) -> Status {
        *outcome = StepOutcome::default();
        self.usable("completed_integrator_step")
    }

    fn get_real(&mut self, references: &[ValueReference], values: &mut [f64]) -> Status {
        let (h_rate, v_rate) = self.rates();
        for (value, reference) in values.iter_mut().zip(references) {
            *value = match reference.0 {
                TIME => self.time,
                HEIGHT => self.h,
                HEIGHT_RATE => h_rate,
                VELOCITY => self.v,
                VELOCITY_RATE => v_rate,
                GRAVITY => self.parameters.gravity,
                RESTITUTION => self.parameters.restitution,
                _ => {
                    return self
                        .log
                        .fail(Status::Error, || format!("no real variable {reference}"));
                }
            };
        }
        Status::Ok
    }

    fn get_integer(&mut self, references: &[ValueReference], values: &mut [i32]) -> Status {
        for (value, reference) in values.iter_mut().zip(references) {
            if reference.0 != BOUNCES {
                return self
                    .log
                    .fail(Status::Error, || format!("no integer variable {reference}"));
            }
            *value = self.bounces;
        }
        Status::Ok
    }

    fn terminate(&mut self) -> Status {
        let status = self.usable("terminate");
        self.terminated = true;
        status
    }

    fn free_instance(&mut self) {
        self.log
            .emit(Status::Ok, EVENTS, || format!("freed after {} bounces", self.bounces));
    }
}
