//! Typed decode layer for the handful of frame fields the gate consults.
//!
//! Bit and byte positions live here and nowhere else; ingestion and
//! validation only ever see the decoded enums.

use cangate_types::CanFrame;

/// Frame identifiers known to the gate.
pub mod ids {
    /// EPS measured motor torque (telemetry).
    pub const EPS_MOTOR_TORQUE: u32 = 0x260;
    /// SCC cruise state (telemetry).
    pub const CRUISE_STATE: u32 = 0x1D2;
    /// Longitudinal acceleration command.
    pub const ACCEL_CMD: u32 = 0x343;
    /// LKAS steering torque command.
    pub const STEER_CMD: u32 = 0x2E4;
    /// Alternate-mode steering commands, never allowed.
    pub const DENIED: [u32; 2] = [0x266, 0x167];
}

/// Decoded inbound telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Telemetry {
    /// Raw measured motor torque, before scaling.
    MotorTorque(i16),
    /// Cruise engagement nibble; nonzero means engaged.
    CruiseState(u8),
}

/// Decoded outbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Denied,
    Accel(i16),
    Steer(i16),
    /// A command identifier whose payload is too short to read.
    Truncated,
    /// Not a frame the gate has an opinion on.
    Other,
}

/// Signed big-endian 16-bit field starting at byte `hi`.
fn be_i16(payload: &[u8], hi: usize) -> Option<i16> {
    let bytes: [u8; 2] = payload.get(hi..hi + 2)?.try_into().ok()?;
    Some(i16::from_be_bytes(bytes))
}

/// Decode an inbound frame.  Returns `None` for unrelated identifiers and
/// for frames too short to carry the field.
pub fn decode_rx(frame: &CanFrame) -> Option<Telemetry> {
    let payload = frame.payload();
    match frame.id {
        // Bytes 5 (high) and 6 (low).
        ids::EPS_MOTOR_TORQUE => be_i16(payload, 5).map(Telemetry::MotorTorque),
        // Bits 52..55: upper nibble of byte 6.
        ids::CRUISE_STATE => payload.get(6).map(|b| Telemetry::CruiseState(b >> 4)),
        _ => None,
    }
}

/// Classify an outbound frame.
pub fn decode_tx(frame: &CanFrame) -> Command {
    let payload = frame.payload();
    match frame.id {
        id if ids::DENIED.contains(&id) => Command::Denied,
        // Bytes 0 (high) and 1 (low).
        ids::ACCEL_CMD => be_i16(payload, 0).map_or(Command::Truncated, Command::Accel),
        // Bytes 1 (high) and 2 (low).
        ids::STEER_CMD => be_i16(payload, 1).map_or(Command::Truncated, Command::Steer),
        _ => Command::Other,
    }
}

/// Encode a steering command payload.  Inverse of the `STEER_CMD` decode;
/// used by tests and tooling that synthesise frames.
pub fn steer_payload(torque: i16) -> [u8; 4] {
    let [hi, lo] = torque.to_be_bytes();
    [0, hi, lo, 0]
}

/// Encode an acceleration command payload.
pub fn accel_payload(accel: i16) -> [u8; 2] {
    accel.to_be_bytes()
}

/// Encode an EPS motor torque telemetry payload.
pub fn motor_torque_payload(raw: i16) -> [u8; 8] {
    let [hi, lo] = raw.to_be_bytes();
    [0, 0, 0, 0, 0, hi, lo, 0]
}

/// Encode a cruise state telemetry payload.
pub fn cruise_state_payload(engaged: bool) -> [u8; 8] {
    let nibble = if engaged { 0x10 } else { 0x00 };
    [0, 0, 0, 0, 0, 0, nibble, 0]
}
