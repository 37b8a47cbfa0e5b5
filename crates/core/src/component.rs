use crate::{Callbacks, EventInfo, Status, StepOutcome, ValueReference};

/// A loaded component implementation that can create instances.
///
/// A binding is what a driver obtains after locating and loading a component;
/// how that happens is outside the scope of this crate. Drivers never depend on
/// a concrete binding, only on this trait.
pub trait Binding {
    /// The instance type created by [`instantiate`](Self::instantiate).
    type Component: Component;

    /// Returns the GUID the implementation was built for.
    ///
    /// Drivers pass it back to [`instantiate`](Self::instantiate), which must
    /// refuse mismatched values.
    fn guid(&self) -> &str;

    /// Creates a new, exclusively owned instance.
    ///
    /// Returns `None` if the instance cannot be created, which drivers treat
    /// as a fatal condition.
    fn instantiate(
        &self,
        instance_name: &str,
        guid: &str,
        callbacks: Callbacks,
        visible: bool,
        logging_on: bool,
    ) -> Option<Self::Component>;
}

/// A hybrid continuous/discrete model instance driven in Model Exchange mode.
///
/// The driver owns integration: the component only supplies continuous states,
/// their derivatives, and event indicators, and it resolves discrete state
/// changes when asked to.
///
/// Every operation returns a [`Status`]. Buffers passed to the getters and
/// setters are sized by the driver from
/// [`number_of_continuous_states`](Self::number_of_continuous_states) and
/// [`number_of_event_indicators`](Self::number_of_event_indicators).
pub trait Component {
    /// Number of continuous states, fixed for the life of the instance.
    fn number_of_continuous_states(&self) -> usize;

    /// Number of event indicators, fixed for the life of the instance.
    fn number_of_event_indicators(&self) -> usize;

    fn set_debug_logging(&mut self, logging_on: bool, categories: &[String]) -> Status;

    /// Declares the experiment before initialization.
    ///
    /// A `tolerance` of `None` means the driver did not define one.
    fn setup_experiment(
        &mut self,
        tolerance: Option<f64>,
        start_time: f64,
        stop_time: Option<f64>,
    ) -> Status;

    fn enter_initialization_mode(&mut self) -> Status;

    fn exit_initialization_mode(&mut self) -> Status;

    /// Advances the discrete state once and reports the result in `event_info`.
    fn new_discrete_states(&mut self, event_info: &mut EventInfo) -> Status;

    fn enter_continuous_time_mode(&mut self) -> Status;

    fn enter_event_mode(&mut self) -> Status;

    fn get_continuous_states(&mut self, states: &mut [f64]) -> Status;

    /// Writes the state derivatives for the current time and states.
    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> Status;

    fn set_continuous_states(&mut self, states: &[f64]) -> Status;

    fn set_time(&mut self, time: f64) -> Status;

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> Status;

    /// Tells the component an integrator step has been completed.
    ///
    /// The component reports in `outcome` whether it wants event mode entered
    /// (a step event) and whether the simulation should end.
    fn completed_integrator_step(
        &mut self,
        no_set_state_prior: bool,
        outcome: &mut StepOutcome,
    ) -> Status;

    fn get_real(&mut self, references: &[ValueReference], values: &mut [f64]) -> Status;

    fn get_integer(&mut self, references: &[ValueReference], values: &mut [i32]) -> Status;

    /// Ends the simulation run of this instance.
    fn terminate(&mut self) -> Status;

    /// Releases every resource held by the instance.
    ///
    /// Drivers call this exactly once, after which no other operation is used.
    fn free_instance(&mut self);
}
