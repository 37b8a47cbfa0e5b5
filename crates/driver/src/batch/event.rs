use crate::StepReport;

/// Event emitted by a batch run after each committed step.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    pub report: StepReport,

    /// The latest sample, indexed like the variable directory (slot 0 is time).
    pub values: &'a [f64],
}
