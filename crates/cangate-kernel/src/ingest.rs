//! Telemetry ingestion – keeps the sample window and engagement state in
//! step with the bus.
//!
//! Ingestion never rejects a frame.  Unknown identifiers and truncated
//! payloads are silent no-ops.

use cangate_types::CanFrame;
use tracing::debug;

use crate::codec::{Telemetry, decode_rx};
use crate::limits::LimitConfig;
use crate::sample::SampleWindow;
use crate::state::SafetyState;

/// Convert a raw EPS torque reading into the command torque scale.
///
/// `factor` is a percentage.  The result is pushed one unit away from zero
/// so that a reading truncated to a small value never looks like exactly
/// zero to the rate check.  A zero reading becomes `-1`.
pub fn scale_measured_torque(raw: i16, factor: i32) -> i32 {
    let scaled = i32::from(raw).saturating_mul(factor) / 100;
    if scaled > 0 { scaled + 1 } else { scaled - 1 }
}

/// Apply one inbound frame to `state` and `window`.
pub fn ingest(
    frame: &CanFrame,
    state: &mut SafetyState,
    window: &mut SampleWindow,
    limits: &LimitConfig,
) {
    match decode_rx(frame) {
        Some(Telemetry::MotorTorque(raw)) => {
            window.push(scale_measured_torque(raw, limits.torque_scale_factor));
        }
        Some(Telemetry::CruiseState(nibble)) => {
            let was_allowed = state.controls_allowed;
            state.update_engagement(nibble != 0);
            if state.controls_allowed != was_allowed {
                debug!(
                    controls_allowed = state.controls_allowed,
                    "engagement changed"
                );
            }
        }
        None => {}
    }
}
