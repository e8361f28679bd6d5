use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum payload length of a classic CAN frame.
pub const MAX_PAYLOAD: usize = 8;

/// Index of the bus the vehicle acts on.  Only frames sent here are validated.
pub const PRIMARY_BUS: u8 = 0;

/// A single addressed frame on the actuation / telemetry bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanFrame {
    /// 11-bit standard identifier.
    pub id: u32,
    /// Bus the frame was received on or is destined for.
    pub bus: u8,
    /// Number of valid bytes in `data`.
    pub len: u8,
    pub data: [u8; MAX_PAYLOAD],
}

impl CanFrame {
    /// Build a frame from a payload slice.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::PayloadTooLong`] when `payload` exceeds
    /// [`MAX_PAYLOAD`] bytes.
    pub fn new(id: u32, bus: u8, payload: &[u8]) -> Result<Self, GateError> {
        if payload.len() > MAX_PAYLOAD {
            return Err(GateError::PayloadTooLong(payload.len()));
        }
        let mut data = [0u8; MAX_PAYLOAD];
        for (dst, src) in data.iter_mut().zip(payload) {
            *dst = *src;
        }
        Ok(Self {
            id,
            bus,
            len: payload.len() as u8,
            data,
        })
    }

    /// Decode a frame from the four bxCAN mailbox registers.
    ///
    /// | register | layout |
    /// |---|---|
    /// | `rir`  | standard identifier in bits 21..31 |
    /// | `rdtr` | DLC in bits 0..3, bus number in bits 4..7 |
    /// | `rdlr` | data bytes 0..3, little-endian |
    /// | `rdhr` | data bytes 4..7, little-endian |
    ///
    /// DLC values above 8 are clamped to 8.
    pub fn from_mailbox(rir: u32, rdtr: u32, rdlr: u32, rdhr: u32) -> Self {
        let mut data = [0u8; MAX_PAYLOAD];
        let (lo, hi) = data.split_at_mut(4);
        lo.copy_from_slice(&rdlr.to_le_bytes());
        hi.copy_from_slice(&rdhr.to_le_bytes());
        Self {
            id: rir >> 21,
            bus: ((rdtr >> 4) & 0xF) as u8,
            len: ((rdtr & 0xF) as u8).min(MAX_PAYLOAD as u8),
            data,
        }
    }

    /// The valid portion of the payload.
    pub fn payload(&self) -> &[u8] {
        let len = usize::from(self.len).min(MAX_PAYLOAD);
        self.data.get(..len).unwrap_or(&[])
    }
}

/// Kind of actuation command carried by an outbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Steer,
    Accel,
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandKind::Steer => write!(f, "steering"),
            CommandKind::Accel => write!(f, "acceleration"),
        }
    }
}

/// Which of the three steering torque checks flagged a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteerFaults {
    /// Magnitude exceeded the absolute torque cap.
    pub absolute: bool,
    /// Outside both the per-message rate bound and the measured-torque bound.
    pub rate: bool,
    /// Drifted too far from the real-time checkpoint.
    pub realtime: bool,
}

impl SteerFaults {
    pub fn any(&self) -> bool {
        self.absolute | self.rate | self.realtime
    }
}

impl std::fmt::Display for SteerFaults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = [
            (self.absolute, "absolute limit"),
            (self.rate, "rate limit"),
            (self.realtime, "real-time limit"),
        ];
        let mut first = true;
        for (_, name) in names.iter().filter(|(set, _)| *set) {
            if !first {
                write!(f, " + ")?;
            }
            write!(f, "{name}")?;
            first = false;
        }
        if first {
            write!(f, "no limit")?;
        }
        Ok(())
    }
}

/// Reason an outbound command frame was refused.
///
/// A violation is a normal outcome of validation, not a failure of the gate:
/// the frame is simply not forwarded.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Violation {
    #[error("identifier {id:#x} is deny-listed on the primary bus")]
    DenyListed { id: u32 },

    #[error("acceleration {value} outside [{min}, {max}]")]
    AccelOutOfRange { value: i16, min: i32, max: i32 },

    #[error("nonzero {kind} command {value} while controls are not allowed")]
    NotAllowed { kind: CommandKind, value: i16 },

    #[error("steering torque {value} violates {faults}")]
    SteerLimits { value: i16, faults: SteerFaults },

    #[error("frame {id:#x} carries {len} bytes, too short for its command field")]
    Truncated { id: u32, len: u8 },
}

/// Safety model the gate runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyMode {
    /// Torque/acceleration limits for the Hyundai LKAS/SCC frame set.
    #[default]
    Hyundai,
    /// Refuse every outbound frame.
    NoOutput,
}

impl std::fmt::Display for SafetyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SafetyMode::Hyundai => write!(f, "hyundai"),
            SafetyMode::NoOutput => write!(f, "no_output"),
        }
    }
}

/// Errors raised outside the per-frame path: building frames, loading
/// configuration, reading replay logs.
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum GateError {
    #[error("Payload of {0} bytes exceeds the 8-byte frame limit")]
    PayloadTooLong(usize),

    #[error("Invalid hex payload: {0}")]
    InvalidHex(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("Replay record {line}: {details}")]
    Replay { line: usize, details: String },

    #[error("I/O Error: {0}")]
    Io(String),
}
