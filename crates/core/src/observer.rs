/// Watches a run as it goes and may ask it to change course.
///
/// The batch driver calls `observe` once after every committed step, with an
/// event carrying the step report and the freshly recorded values. Returning
/// `None` lets the run continue; returning `Some(action)` applies the action
/// before the next step, such as stopping the run early with the results
/// recorded so far.
///
/// Closures implement `Observer`, and `()` is an observer that never acts.
pub trait Observer<E, A> {
    /// Observes a driver event and optionally returns a control action.
    fn observe(&mut self, event: &E) -> Option<A>;
}

/// Blanket implementation for observer closures.
impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

/// A no-op observer that always returns `None`.
impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}
