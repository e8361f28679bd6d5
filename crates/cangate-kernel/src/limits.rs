//! [`LimitConfig`] – numeric bounds applied by the command validator.
//!
//! Everything except the torque scale factor and the actuation-limits toggle
//! is a build-time constant.  Both runtime fields are written only through
//! [`SafetyHooks::init`][crate::gate::SafetyHooks::init] and
//! [`SafetyHooks::set_actuation_limits`][crate::gate::SafetyHooks::set_actuation_limits].

/// Absolute, rate and real-time limits for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitConfig {
    /// Absolute magnitude cap on commanded steering torque.
    pub max_torque: i32,
    /// Max per-message increase in commanded torque.
    pub max_rate_up: i32,
    /// Max per-message decrease in commanded torque.
    pub max_rate_down: i32,
    /// Max deviation of commanded torque from the latest measured torque.
    pub max_torque_error: i32,
    /// Max deviation from the real-time checkpoint.
    pub max_rt_delta: i32,
    /// Checkpoint refresh period in microseconds.
    pub rt_interval_us: u32,
    /// Upper acceleration bound (mm/s²).
    pub max_accel: i32,
    /// Lower acceleration bound (mm/s²).
    pub min_accel: i32,
    /// Percent conversion applied to measured torque telemetry.
    pub torque_scale_factor: i32,
    /// When false only the disengaged-must-be-zero rule applies.
    pub actuation_limits: bool,
}

impl LimitConfig {
    /// Limits for the Hyundai LKAS (`0x2E4`) and SCC (`0x343`) commands.
    ///
    /// The steering frame is sent at 100 Hz, so the rate limits allow
    /// 200/s up and 400/s down, and the real-time check allows 200 per 250 ms.
    pub const HYUNDAI: Self = Self {
        max_torque: 102,
        max_rate_up: 2,
        max_rate_down: 4,
        max_torque_error: 50,
        max_rt_delta: 50,
        rt_interval_us: 250_000,
        max_accel: 1500,
        min_accel: -3000,
        torque_scale_factor: 128,
        actuation_limits: true,
    };

    /// Same limits with a different telemetry scale factor.
    pub const fn with_torque_scale_factor(mut self, factor: i16) -> Self {
        self.torque_scale_factor = factor as i32;
        self
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self::HYUNDAI
    }
}
