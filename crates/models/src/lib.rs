//! Reference components for the Shuttle driver.
//!
//! - [`bouncing_ball`] — two continuous states and one event indicator; every
//!   bounce is a state event
//! - [`stair`] — no continuous states; a periodic time event increments a
//!   counter, optionally until a limit ends the simulation
//!
//! Both implement [`shuttle_core::Binding`] and report their messages through
//! the logger in the [`shuttle_core::Callbacks`] they are instantiated with.

pub mod bouncing_ball;
pub mod stair;

mod log;

pub use bouncing_ball::{BouncingBall, BouncingBallBinding, Parameters};
pub use log::{EVENTS, STATUS};
pub use stair::{Stair, StairBinding};
