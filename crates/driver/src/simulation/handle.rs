use std::ops::{Deref, DerefMut};

use shuttle_core::Component;
use tracing::trace;

/// Exclusive ownership of a component instance.
///
/// Dropping the handle frees the instance, so it is freed exactly once on
/// every path out of a run: success, failure, or abandonment.
pub(super) struct Handle<C: Component> {
    component: C,
}

impl<C: Component> Handle<C> {
    pub(super) fn new(component: C) -> Self {
        Self { component }
    }
}

impl<C: Component> Deref for Handle<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.component
    }
}

impl<C: Component> DerefMut for Handle<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.component
    }
}

impl<C: Component> Drop for Handle<C> {
    fn drop(&mut self) {
        self.component.free_instance();
        trace!("instance freed");
    }
}
