use std::fmt;

/// Status returned by every component call.
///
/// Variants are declared in ascending severity, so the derived ordering is the
/// severity ordinal: `Ok < Warning < Discard < Error < Fatal`.
///
/// A call has succeeded when its status is at most [`Status::Warning`].
/// Anything above that is a failure and the driver must not continue the
/// current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    /// The call completed normally.
    Ok,

    /// The call completed, but something noteworthy happened.
    Warning,

    /// The call did not apply its result.
    ///
    /// Returned by the driver's step executor when there is nothing left to do.
    Discard,

    /// The call failed; the instance may not be usable for further calls.
    Error,

    /// The call failed irrecoverably; no instance may be used any further.
    Fatal,
}

impl Status {
    /// Returns `true` if the status is strictly more severe than a warning.
    #[must_use]
    pub fn is_failure(self) -> bool {
        self > Self::Warning
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ok => "OK",
            Self::Warning => "Warning",
            Self::Discard => "Discard",
            Self::Error => "Error",
            Self::Fatal => "Fatal",
        };
        f.write_str(name)
    }
}
