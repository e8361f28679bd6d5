//! [`SafetyGate`] – the hook table the bus layer calls on every frame.
//!
//! The bus interface drives a [`SafetyHooks`] implementation:
//!
//! | hook | called for | returns |
//! |---|---|---|
//! | [`init`][SafetyHooks::init] | session start | – |
//! | [`set_actuation_limits`][SafetyHooks::set_actuation_limits] | configuration | – |
//! | [`rx`][SafetyHooks::rx] | every received frame | – |
//! | [`tx`][SafetyHooks::tx] | every frame about to be sent | `true` = forward |
//! | [`tx_lin`][SafetyHooks::tx_lin] | every LIN frame about to be sent | `true` = forward |
//! | [`fwd`][SafetyHooks::fwd] | every received frame | bus to forward to, if any |
//!
//! # Example
//!
//! ```
//! use cangate_kernel::{ManualClock, SafetyGate, SafetyHooks};
//! use cangate_kernel::codec::{cruise_state_payload, ids, steer_payload};
//! use cangate_types::CanFrame;
//!
//! let clock = ManualClock::new(0);
//! let mut gate = SafetyGate::new(Box::new(clock.clone()));
//! gate.init(128);
//!
//! let steer = CanFrame::new(ids::STEER_CMD, 0, &steer_payload(2)).unwrap();
//! assert!(!gate.tx(&steer)); // not engaged yet
//!
//! gate.rx(&CanFrame::new(ids::CRUISE_STATE, 0, &cruise_state_payload(true)).unwrap());
//! clock.advance(10_000);
//! assert!(gate.tx(&steer));
//! ```

use cangate_types::{CanFrame, SafetyMode, Violation};
use tracing::{debug, trace, warn};

use crate::clock::Clock;
use crate::ingest::ingest;
use crate::limits::LimitConfig;
use crate::sample::SampleWindow;
use crate::state::SafetyState;
use crate::validator::validate;

/// Per-frame safety hooks.
///
/// Implementations never block and never fail: every outbound frame gets a
/// yes/no answer within the call.
pub trait SafetyHooks: Send {
    /// Which safety model this is.
    fn mode(&self) -> SafetyMode;

    /// Start a session.  `param` is the mode-specific parameter; for the
    /// Hyundai model it is the EPS torque scale factor in percent.
    fn init(&mut self, param: i16);

    /// Enable or disable the absolute / rate checks.  The rule that a
    /// disengaged controller must command zero always applies.  Models
    /// without such checks ignore this.
    fn set_actuation_limits(&mut self, _enabled: bool) {}

    /// Observe a received frame.
    fn rx(&mut self, frame: &CanFrame);

    /// Decide whether `frame` may be sent.
    fn tx(&mut self, frame: &CanFrame) -> bool;

    /// Decide whether a LIN frame may be sent.
    fn tx_lin(&mut self, lin_num: u8, data: &[u8]) -> bool;

    /// Bus a received frame should be forwarded to, or `None`.
    fn fwd(&mut self, bus: u8, frame: &CanFrame) -> Option<u8>;
}

/// Build the hooks for `mode`, reading time from `clock`.
pub fn hooks_for(mode: SafetyMode, clock: Box<dyn Clock>) -> Box<dyn SafetyHooks> {
    match mode {
        SafetyMode::Hyundai => Box::new(SafetyGate::new(clock)),
        SafetyMode::NoOutput => Box::new(NoOutputHooks),
    }
}

/// Torque and acceleration gate for the Hyundai frame set.
pub struct SafetyGate {
    limits: LimitConfig,
    state: SafetyState,
    window: SampleWindow,
    clock: Box<dyn Clock>,
}

impl SafetyGate {
    /// Create a gate with [`LimitConfig::HYUNDAI`] and disengaged state.
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self::with_limits(LimitConfig::HYUNDAI, clock)
    }

    /// Create a gate with custom limits.
    pub fn with_limits(limits: LimitConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            limits,
            state: SafetyState::new(),
            window: SampleWindow::new(),
            clock,
        }
    }

    pub fn limits(&self) -> &LimitConfig {
        &self.limits
    }

    pub fn state(&self) -> &SafetyState {
        &self.state
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    /// Validate `frame` and report why it was refused.
    ///
    /// # Errors
    ///
    /// Returns the [`Violation`] when the frame must not be forwarded.
    pub fn check(&mut self, frame: &CanFrame) -> Result<(), Violation> {
        let now = self.clock.now_us();
        validate(frame, &mut self.state, &self.window, &self.limits, now)
    }
}

impl SafetyHooks for SafetyGate {
    fn mode(&self) -> SafetyMode {
        SafetyMode::Hyundai
    }

    fn init(&mut self, param: i16) {
        self.state.controls_allowed = false;
        self.limits.actuation_limits = true;
        self.limits = self.limits.with_torque_scale_factor(param);
        debug!(torque_scale_factor = param, "safety gate initialised");
    }

    fn set_actuation_limits(&mut self, enabled: bool) {
        self.limits.actuation_limits = enabled;
        debug!(actuation_limits = enabled, "actuation limits toggled");
    }

    fn rx(&mut self, frame: &CanFrame) {
        ingest(frame, &mut self.state, &mut self.window, &self.limits);
    }

    fn tx(&mut self, frame: &CanFrame) -> bool {
        match self.check(frame) {
            Ok(()) => {
                trace!(id = frame.id, bus = frame.bus, "frame forwarded");
                true
            }
            Err(violation) => {
                warn!(id = frame.id, bus = frame.bus, reason = %violation, "frame dropped");
                false
            }
        }
    }

    fn tx_lin(&mut self, _lin_num: u8, _data: &[u8]) -> bool {
        // No LIN safety model is defined.
        true
    }

    fn fwd(&mut self, _bus: u8, _frame: &CanFrame) -> Option<u8> {
        None
    }
}

/// Silent mode: nothing leaves the gate.
pub struct NoOutputHooks;

impl SafetyHooks for NoOutputHooks {
    fn mode(&self) -> SafetyMode {
        SafetyMode::NoOutput
    }

    fn init(&mut self, _param: i16) {}

    fn rx(&mut self, _frame: &CanFrame) {}

    fn tx(&mut self, _frame: &CanFrame) -> bool {
        false
    }

    fn tx_lin(&mut self, _lin_num: u8, _data: &[u8]) -> bool {
        false
    }

    fn fwd(&mut self, _bus: u8, _frame: &CanFrame) -> Option<u8> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::codec::{accel_payload, cruise_state_payload, ids, motor_torque_payload, steer_payload};

    fn gate() -> (SafetyGate, ManualClock) {
        let clock = ManualClock::new(0);
        let mut gate = SafetyGate::new(Box::new(clock.clone()));
        gate.init(128);
        (gate, clock)
    }

    fn frame(id: u32, payload: &[u8]) -> CanFrame {
        CanFrame::new(id, 0, payload).unwrap()
    }

    fn engage(gate: &mut SafetyGate) {
        gate.rx(&frame(ids::CRUISE_STATE, &cruise_state_payload(false)));
        gate.rx(&frame(ids::CRUISE_STATE, &cruise_state_payload(true)));
    }

    #[test]
    fn init_disables_controls_and_sets_scale() {
        let (mut gate, _clock) = gate();
        engage(&mut gate);
        gate.set_actuation_limits(false);
        assert!(gate.state().controls_allowed);

        gate.init(90);
        assert!(!gate.state().controls_allowed);
        assert!(gate.limits().actuation_limits);
        assert_eq!(gate.limits().torque_scale_factor, 90);
    }

    #[test]
    fn rx_feeds_sample_window_with_scale() {
        let (mut gate, _clock) = gate();
        gate.rx(&frame(ids::EPS_MOTOR_TORQUE, &motor_torque_payload(100)));
        assert_eq!(gate.window().latest(), 129);
    }

    #[test]
    fn tx_returns_bool_verdict() {
        let (mut gate, _clock) = gate();
        assert!(gate.tx(&frame(ids::ACCEL_CMD, &accel_payload(0))));
        assert!(!gate.tx(&frame(ids::ACCEL_CMD, &accel_payload(100))));
        engage(&mut gate);
        assert!(gate.tx(&frame(ids::ACCEL_CMD, &accel_payload(100))));
    }

    #[test]
    fn tx_uses_clock_for_checkpoint() {
        let (mut gate, clock) = gate();
        engage(&mut gate);
        clock.set(300_000);
        assert!(gate.tx(&frame(ids::STEER_CMD, &steer_payload(2))));
        assert_eq!(gate.state().rt_torque_last, 2);
        assert_eq!(gate.state().ts_last, 300_000);
    }

    #[test]
    fn lin_passes_and_fwd_is_none() {
        let (mut gate, _clock) = gate();
        assert!(gate.tx_lin(1, &[0xFF; 8]));
        assert_eq!(gate.fwd(0, &frame(ids::STEER_CMD, &steer_payload(0))), None);
    }

    #[test]
    fn no_output_refuses_everything() {
        let mut hooks = hooks_for(SafetyMode::NoOutput, Box::new(ManualClock::new(0)));
        hooks.init(128);
        assert_eq!(hooks.mode(), SafetyMode::NoOutput);
        assert!(!hooks.tx(&frame(0x123, &[0; 8])));
        assert!(!hooks.tx_lin(0, &[]));
        assert_eq!(hooks.fwd(0, &frame(0x123, &[0; 8])), None);
    }

    #[test]
    fn hooks_for_hyundai_is_gate() {
        let hooks = hooks_for(SafetyMode::Hyundai, Box::new(ManualClock::new(0)));
        assert_eq!(hooks.mode(), SafetyMode::Hyundai);
    }
}
