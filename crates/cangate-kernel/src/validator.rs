//! Command validation – the accept/reject decision for outbound frames.
//!
//! Only frames on [`PRIMARY_BUS`] are validated.  On that bus:
//!
//! 1. Deny-listed identifiers are always refused.
//! 2. Acceleration commands must lie in `[min_accel, max_accel]` while
//!    engaged, and must be exactly zero while disengaged.
//! 3. Steering commands run three checks (absolute, rate-vs-measurement,
//!    real-time delta) without short-circuiting, update the torque history
//!    and the real-time checkpoint, and collapse the history to zero on any
//!    violation or while disengaged.
//! 4. Everything else passes.
//!
//! # Example
//!
//! ```
//! use cangate_kernel::codec::{ids, steer_payload};
//! use cangate_kernel::limits::LimitConfig;
//! use cangate_kernel::sample::SampleWindow;
//! use cangate_kernel::state::SafetyState;
//! use cangate_kernel::validator::validate;
//! use cangate_types::CanFrame;
//!
//! let mut state = SafetyState::new();
//! let window = SampleWindow::new();
//! let limits = LimitConfig::HYUNDAI;
//!
//! // Disengaged: zero torque passes, anything else is refused.
//! let zero = CanFrame::new(ids::STEER_CMD, 0, &steer_payload(0)).unwrap();
//! assert!(validate(&zero, &mut state, &window, &limits, 0).is_ok());
//! let nudge = CanFrame::new(ids::STEER_CMD, 0, &steer_payload(1)).unwrap();
//! assert!(validate(&nudge, &mut state, &window, &limits, 0).is_err());
//! ```

use cangate_types::{CanFrame, CommandKind, PRIMARY_BUS, SteerFaults, Violation};

use crate::checks::{exceeds_max, exceeds_rt_delta, outside_range, outside_rate_or_measurement};
use crate::clock::elapsed_us;
use crate::codec::{Command, decode_tx};
use crate::limits::LimitConfig;
use crate::sample::SampleWindow;
use crate::state::SafetyState;

/// Decide whether `frame` may be forwarded to the vehicle.
///
/// `now` is the current microsecond timestamp.  Steering frames rewrite the
/// torque history in `state` whether or not they are accepted.
///
/// # Errors
///
/// Returns the [`Violation`] that caused the frame to be refused.
pub fn validate(
    frame: &CanFrame,
    state: &mut SafetyState,
    window: &SampleWindow,
    limits: &LimitConfig,
    now: u32,
) -> Result<(), Violation> {
    if frame.bus != PRIMARY_BUS {
        return Ok(());
    }

    match decode_tx(frame) {
        Command::Denied => Err(Violation::DenyListed { id: frame.id }),
        Command::Accel(value) => check_accel(value, state, limits),
        Command::Steer(value) => check_steer(value, state, window, limits, now),
        Command::Truncated => Err(Violation::Truncated {
            id: frame.id,
            len: frame.len,
        }),
        Command::Other => Ok(()),
    }
}

fn check_accel(value: i16, state: &SafetyState, limits: &LimitConfig) -> Result<(), Violation> {
    if state.controls_allowed {
        if limits.actuation_limits
            && outside_range(i32::from(value), limits.min_accel, limits.max_accel)
        {
            return Err(Violation::AccelOutOfRange {
                value,
                min: limits.min_accel,
                max: limits.max_accel,
            });
        }
    } else if value != 0 {
        return Err(Violation::NotAllowed {
            kind: CommandKind::Accel,
            value,
        });
    }
    Ok(())
}

fn check_steer(
    value: i16,
    state: &mut SafetyState,
    window: &SampleWindow,
    limits: &LimitConfig,
    now: u32,
) -> Result<(), Violation> {
    let torque = i32::from(value);
    let mut faults = SteerFaults::default();

    if state.controls_allowed && limits.actuation_limits {
        faults.absolute = exceeds_max(torque, limits.max_torque);
        faults.rate = outside_rate_or_measurement(
            torque,
            state.desired_torque_last,
            window.latest(),
            limits.max_rate_up,
            limits.max_rate_down,
            limits.max_torque_error,
        );

        // Next rate baseline is the last commanded value, accepted or not.
        state.desired_torque_last = torque;

        faults.realtime = exceeds_rt_delta(torque, state.rt_torque_last, limits.max_rt_delta);

        // The checkpoint clock is free-running: it advances on rejected frames too.
        if elapsed_us(now, state.ts_last) > limits.rt_interval_us {
            state.rt_torque_last = torque;
            state.ts_last = now;
        }
    }

    let not_allowed = !state.controls_allowed && torque != 0;

    if faults.any() || !state.controls_allowed {
        state.reset_torque_history(now);
    }

    if not_allowed {
        Err(Violation::NotAllowed {
            kind: CommandKind::Steer,
            value,
        })
    } else if faults.any() {
        Err(Violation::SteerLimits { value, faults })
    } else {
        Ok(())
    }
}
