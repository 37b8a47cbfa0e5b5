/// Control actions supported by a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the run after the current step, tear down, and return the summary
    /// so far.
    StopEarly,
}
