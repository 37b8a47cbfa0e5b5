//! The component capability contract driven by Shuttle.
//!
//! A component is a hybrid continuous/discrete-event model exposed through a
//! fixed set of operations: instantiate, set up an experiment, move between
//! initialization, event, and continuous-time modes, exchange states,
//! derivatives, and event indicators, and terminate. This crate defines that
//! contract so drivers and component implementations can meet in the middle:
//!
//! - [`Binding`] — a loaded implementation that creates instances
//! - [`Component`] — an instance and every operation a driver may call on it
//! - [`Status`] — the severity-ordered result of every operation
//! - [`EventInfo`], [`StepOutcome`] — records exchanged during event handling
//! - [`VariableDirectory`] — the ordered catalog of a component's variables
//! - [`Callbacks`] — the [`Logger`] and [`Allocator`] handed to an instance
//! - [`Observer`] — receives driver events and optionally returns control actions

mod callbacks;
mod component;
mod event_info;
mod observer;
mod status;
mod variable;

pub use callbacks::{AllocError, Allocator, Callbacks, Logger, SystemAllocator, TracingLogger};
pub use component::{Binding, Component};
pub use event_info::{EventInfo, StepOutcome};
pub use observer::Observer;
pub use status::Status;
pub use variable::{ValueReference, Variable, VariableDirectory, VariableType};
