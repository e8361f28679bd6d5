//! [`SafetyState`] – mutable command history and engagement record.

/// Everything the gate remembers between frames.
///
/// Written by telemetry ingestion (engagement fields) and the command
/// validator (torque history).  Construct a fresh value per session, or per
/// test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SafetyState {
    /// Whether the automation computer may command actuation.
    pub controls_allowed: bool,
    /// Last commanded steering torque; baseline for the per-message rate check.
    pub desired_torque_last: i32,
    /// Steering torque at the last real-time checkpoint.
    pub rt_torque_last: i32,
    /// Timestamp (µs) of the last real-time checkpoint.
    pub ts_last: u32,
    /// Last observed engagement flag, for rising-edge detection.
    pub cruise_engaged_last: bool,
}

impl SafetyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collapse the torque history to zero so that the next engagement
    /// starts from a clean baseline.
    pub fn reset_torque_history(&mut self, now: u32) {
        self.desired_torque_last = 0;
        self.rt_torque_last = 0;
        self.ts_last = now;
    }

    /// Apply an engagement telemetry sample.
    ///
    /// Entry requires a rising edge; exit is immediate.
    pub fn update_engagement(&mut self, engaged: bool) {
        if engaged && !self.cruise_engaged_last {
            self.controls_allowed = true;
        } else if !engaged {
            self.controls_allowed = false;
        }
        self.cruise_engaged_last = engaged;
    }
}
