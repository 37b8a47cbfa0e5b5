use shuttle_core::Component;
use tracing::{debug, info, trace};

use crate::error::{Call, Error, Phase};

use super::Simulation;

/// How a settling loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Settled {
    /// The discrete states reached a fixed point; integration may continue.
    Continue,

    /// The model asked to end the simulation.
    Terminated,
}

impl<C: Component> Simulation<C> {
    /// Updates the discrete states until the component needs no further update.
    ///
    /// Used after initialization and after every handled event. The loop is
    /// bounded by the experiment's `max_settle_iters`.
    pub(super) fn settle(&mut self, phase: Phase) -> Result<Settled, Error> {
        self.event_info.new_discrete_states_needed = true;

        let mut iters = 0;
        while self.event_info.new_discrete_states_needed && !self.event_info.terminate_simulation
        {
            if iters == self.max_settle_iters {
                return Err(Error::NotSettled {
                    iters,
                    time: self.time,
                });
            }
            iters += 1;

            let status = self.component.new_discrete_states(&mut self.event_info);
            phase.check(Call::NewDiscreteStates, status, self.time)?;

            if self.event_info.values_of_continuous_states_changed {
                debug!(time = self.time, "continuous state values changed");
            }
            if self.event_info.nominals_of_continuous_states_changed {
                debug!(time = self.time, "continuous state nominals changed");
            }
        }
        trace!(time = self.time, iters, "discrete states settled");

        if self.event_info.terminate_simulation {
            info!(time = self.time, "model requested termination");
            self.mark_terminated();
            return Ok(Settled::Terminated);
        }
        Ok(Settled::Continue)
    }
}
