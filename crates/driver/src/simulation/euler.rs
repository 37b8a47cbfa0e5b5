/// Advances states in place by one explicit (forward) Euler step.
///
/// ```text
/// x_{n+1} = x_n + dt * xdot_n
/// ```
///
/// The derivatives must belong to the states before the advance.
pub(crate) fn advance(states: &mut [f64], derivatives: &[f64], dt: f64) {
    debug_assert_eq!(states.len(), derivatives.len());

    for (state, derivative) in states.iter_mut().zip(derivatives) {
        *state += dt * derivative;
    }
}
