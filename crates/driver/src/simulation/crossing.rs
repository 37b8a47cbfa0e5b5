//! Zero-crossing detection over event indicators.
//!
//! An indicator crosses zero when its sign differs from the sign it had at the
//! previous comparison. A reading of exactly zero carries no sign: the
//! previous buffer keeps the last nonzero reading, so a value that lands on
//! zero and then continues to the other side fires exactly once, and a value
//! that touches zero and returns fires never.

/// Carries the current readings into the previous buffer before a refresh.
///
/// Zero readings are not carried, so `previous` holds the last nonzero value.
pub(crate) fn carry(previous: &mut [f64], current: &[f64]) {
    for (prev, &curr) in previous.iter_mut().zip(current) {
        if curr != 0.0 {
            *prev = curr;
        }
    }
}

/// Iterates over the indices of indicators that changed sign.
pub(crate) fn crossings<'a>(
    previous: &'a [f64],
    current: &'a [f64],
) -> impl Iterator<Item = usize> + 'a {
    previous
        .iter()
        .zip(current)
        .enumerate()
        .filter(|(_, (prev, curr))| **prev * **curr < 0.0)
        .map(|(i, _)| i)
}
