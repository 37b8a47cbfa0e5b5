/// Event information exchanged with a component during discrete-state updates.
///
/// The driver hands the same record to every call of
/// [`Component::new_discrete_states`](crate::Component::new_discrete_states),
/// and the component overwrites the fields that describe its discrete state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventInfo {
    /// Another discrete-state update is required before integration may continue.
    pub new_discrete_states_needed: bool,

    /// The model asks the driver to end the simulation.
    ///
    /// Once observed by the driver this request is never withdrawn.
    pub terminate_simulation: bool,

    /// Advisory: the nominal values of the continuous states changed.
    pub nominals_of_continuous_states_changed: bool,

    /// Advisory: the values of the continuous states changed.
    pub values_of_continuous_states_changed: bool,

    /// Whether [`next_event_time`](Self::next_event_time) is meaningful.
    pub next_event_time_defined: bool,

    /// Simulated time of the next scheduled time event.
    pub next_event_time: f64,
}

impl EventInfo {
    /// Returns the next scheduled event time, if the component defined one.
    #[must_use]
    pub fn next_event_time(&self) -> Option<f64> {
        self.next_event_time_defined.then_some(self.next_event_time)
    }

    /// Schedules a time event at `time`.
    pub fn schedule(&mut self, time: f64) {
        self.next_event_time_defined = true;
        self.next_event_time = time;
    }

    /// Clears any scheduled time event.
    pub fn unschedule(&mut self) {
        self.next_event_time_defined = false;
        self.next_event_time = 0.0;
    }
}

/// Result of [`Component::completed_integrator_step`](crate::Component::completed_integrator_step).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// The component signals a step event and wants event mode entered.
    pub enter_event_mode: bool,

    /// The component asks the driver to end the simulation.
    pub terminate_simulation: bool,
}
