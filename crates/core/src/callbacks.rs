//! Services the driver hands to a component at instantiation.
//!
//! - [`Logger`] — receives pre-formatted log messages from the component
//! - [`Allocator`] — hands out zeroed working buffers, fallibly

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::Status;

/// Receives log messages emitted by a component.
///
/// Messages arrive fully formatted, tagged with the instance that produced
/// them, the status the component associates with the message, and a
/// component-defined category.
///
/// Closures with the signature `Fn(&str, Status, &str, &str)` implement
/// `Logger`, so callers can capture whatever context they need.
pub trait Logger {
    /// Handles one message from the component.
    fn log(&self, instance_name: &str, status: Status, category: &str, message: &str);
}

impl<F> Logger for F
where
    F: Fn(&str, Status, &str, &str),
{
    fn log(&self, instance_name: &str, status: Status, category: &str, message: &str) {
        self(instance_name, status, category, message);
    }
}

/// Forwards component messages to [`tracing`].
///
/// The level is derived from the status: `OK` maps to `info`, `Warning` to
/// `warn`, and anything more severe to `error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, instance_name: &str, status: Status, category: &str, message: &str) {
        match status {
            Status::Ok => {
                tracing::info!(instance = instance_name, category, "{message}");
            }
            Status::Warning => {
                tracing::warn!(instance = instance_name, category, "{message}");
            }
            Status::Discard | Status::Error | Status::Fatal => {
                tracing::error!(instance = instance_name, category, %status, "{message}");
            }
        }
    }
}

/// A buffer could not be allocated.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("could not allocate {len} values")]
pub struct AllocError {
    pub len: usize,
}

/// Allocates zero-initialized `f64` buffers.
///
/// Releasing a buffer is dropping it, so an allocator only needs to decide
/// whether an allocation can be satisfied.
pub trait Allocator {
    /// Returns a buffer of `len` zeros.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the buffer cannot be allocated.
    fn allocate(&self, len: usize) -> Result<Vec<f64>, AllocError>;
}

/// Allocates from the global heap, reporting exhaustion instead of aborting.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn allocate(&self, len: usize) -> Result<Vec<f64>, AllocError> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| AllocError { len })?;
        buffer.resize(len, 0.0);
        Ok(buffer)
    }
}

/// The callbacks handed to [`Binding::instantiate`](crate::Binding::instantiate).
#[derive(Clone)]
pub struct Callbacks {
    pub logger: Arc<dyn Logger + Send + Sync>,
    pub allocator: Arc<dyn Allocator + Send + Sync>,
}

impl Callbacks {
    /// Creates callbacks from a logger and an allocator.
    pub fn new(
        logger: impl Logger + Send + Sync + 'static,
        allocator: impl Allocator + Send + Sync + 'static,
    ) -> Self {
        Self {
            logger: Arc::new(logger),
            allocator: Arc::new(allocator),
        }
    }

    /// Returns these callbacks with a different allocator.
    #[must_use]
    pub fn with_allocator(self, allocator: impl Allocator + Send + Sync + 'static) -> Self {
        Self {
            allocator: Arc::new(allocator),
            ..self
        }
    }

    /// Returns these callbacks with a different logger.
    #[must_use]
    pub fn with_logger(self, logger: impl Logger + Send + Sync + 'static) -> Self {
        Self {
            logger: Arc::new(logger),
            ..self
        }
    }
}

impl Default for Callbacks {
    fn default() -> Self {
        Self::new(TracingLogger, SystemAllocator)
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks").finish_non_exhaustive()
    }
}
