use std::sync::Arc;

use shuttle_core::{Callbacks, Logger, Status};

/// Category for event handling messages.
pub const EVENTS: &str = "events";

/// Category for calls that fail or warn.
pub const STATUS: &str = "status";

/// Routes a component's messages to the driver's logger.
///
/// Failures are always reported. Other messages are reported only while debug
/// logging is on and their category is enabled; an empty category list enables
/// every category.
pub(crate) struct Log {
    instance: String,
    logger: Arc<dyn Logger + Send + Sync>,
    on: bool,
    categories: Vec<String>,
}

impl Log {
    pub(crate) fn new(instance: &str, callbacks: &Callbacks, on: bool) -> Self {
        Self {
            instance: instance.to_string(),
            logger: Arc::clone(&callbacks.logger),
            on,
            categories: Vec::new(),
        }
    }

    pub(crate) fn configure(&mut self, on: bool, categories: &[String]) {
        self.on = on;
        self.categories = categories.to_vec();
    }

    fn enabled(&self, category: &str) -> bool {
        self.on && (self.categories.is_empty() || self.categories.iter().any(|c| c == category))
    }

    /// Emits `message` lazily.
    pub(crate) fn emit(&self, status: Status, category: &str, message: impl FnOnce() -> String) {
        if status.is_failure() || self.enabled(category) {
            self.logger.log(&self.instance, status, category, &message());
        }
    }

    /// Reports a failed call and returns `status`.
    pub(crate) fn fail(&self, status: Status, message: impl FnOnce() -> String) -> Status {
        self.emit(status, STATUS, message);
        status
    }
}
