//! Pure limit predicates.
//!
//! Each function returns `true` when the value VIOLATES the limit.  None of
//! them touch state, so the validator can evaluate all of them for every
//! frame and OR the results together.

/// `|value| > max`.
pub fn exceeds_max(value: i32, max: i32) -> bool {
    value > max || value < -max
}

/// Per-message rate check, relaxed by the measured motor torque.
///
/// The allowed range is the union of the rate band around `last` and the
/// error band around `measured`:
///
/// ```text
/// [min(last - rate_down, measured - max_error),
///  max(last + rate_up,   measured + max_error)]
/// ```
///
/// Either band alone is enough to permit a command.
pub fn outside_rate_or_measurement(
    value: i32,
    last: i32,
    measured: i32,
    rate_up: i32,
    rate_down: i32,
    max_error: i32,
) -> bool {
    let highest = (last + rate_up).max(measured + max_error);
    let lowest = (last - rate_down).min(measured - max_error);
    value < lowest || value > highest
}

/// Cumulative drift from the real-time checkpoint: `|value - checkpoint| > max_delta`.
pub fn exceeds_rt_delta(value: i32, checkpoint: i32, max_delta: i32) -> bool {
    exceeds_max(value - checkpoint, max_delta)
}

/// `value` outside the inclusive range `[min, max]`.
pub fn outside_range(value: i32, min: i32, max: i32) -> bool {
    value < min || value > max
}
