//! Replay a recorded frame log through the safety hooks.
//!
//! The log is newline-delimited JSON, one record per frame:
//!
//! ```text
//! {"t_us": 1000, "dir": "rx",  "bus": 0, "id": 466, "data": "0000000000001000"}
//! {"t_us": 2000, "dir": "tx",  "bus": 0, "id": 740, "data": "00000200"}
//! {"t_us": 3000, "dir": "lin", "id": 1, "data": "ff"}
//! ```
//!
//! `t_us` drives the gate's clock, so replays are deterministic.  Blank lines
//! and lines starting with `#` are skipped.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};

use cangate_kernel::{ManualClock, SafetyHooks};
use cangate_types::{CanFrame, GateError};
use serde::Deserialize;
use tracing::info;

/// Direction of a recorded frame relative to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Rx,
    Tx,
    Lin,
}

/// One line of a replay log.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Record {
    pub t_us: u32,
    pub dir: Direction,
    #[serde(default)]
    pub bus: u8,
    /// CAN identifier, or LIN channel for `lin` records.
    pub id: u32,
    /// Hex-encoded payload.
    #[serde(default)]
    pub data: String,
}

impl Record {
    /// Parse a single log line.  `line` is 1-based, for error messages.
    pub fn parse(line: usize, text: &str) -> Result<Self, GateError> {
        serde_json::from_str(text).map_err(|e| GateError::Replay {
            line,
            details: e.to_string(),
        })
    }

    pub fn payload(&self) -> Result<Vec<u8>, GateError> {
        hex::decode(&self.data).map_err(|e| GateError::InvalidHex(format!("{:?}: {e}", self.data)))
    }

    pub fn frame(&self) -> Result<CanFrame, GateError> {
        CanFrame::new(self.id, self.bus, &self.payload()?)
    }
}

/// Verdict for one outbound record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Forwarded,
    Dropped,
}

/// Counters accumulated over a replay.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub ingested: u64,
    pub forwarded: u64,
    pub dropped: u64,
    pub lin_forwarded: u64,
    pub lin_dropped: u64,
    /// Dropped CAN frames per identifier.
    pub dropped_by_id: BTreeMap<u32, u64>,
    /// Set when the replay stopped early on request.
    pub interrupted: bool,
}

/// Drives a [`SafetyHooks`] implementation from a log.
pub struct Replay {
    hooks: Box<dyn SafetyHooks>,
    clock: ManualClock,
    summary: Summary,
}

impl Replay {
    /// `clock` must be the clock `hooks` reads from.
    pub fn new(hooks: Box<dyn SafetyHooks>, clock: ManualClock) -> Self {
        Self {
            hooks,
            clock,
            summary: Summary::default(),
        }
    }

    /// Apply one record.  Returns the verdict for `tx` and `lin` records.
    pub fn step(&mut self, record: &Record) -> Result<Option<Outcome>, GateError> {
        self.clock.set(record.t_us);
        match record.dir {
            Direction::Rx => {
                let frame = record.frame()?;
                self.hooks.rx(&frame);
                self.summary.ingested += 1;
                Ok(None)
            }
            Direction::Tx => {
                let frame = record.frame()?;
                if self.hooks.tx(&frame) {
                    self.summary.forwarded += 1;
                    Ok(Some(Outcome::Forwarded))
                } else {
                    self.summary.dropped += 1;
                    *self.summary.dropped_by_id.entry(frame.id).or_default() += 1;
                    Ok(Some(Outcome::Dropped))
                }
            }
            Direction::Lin => {
                let lin_num = u8::try_from(record.id).map_err(|_| GateError::Replay {
                    line: 0,
                    details: format!("LIN channel {} out of range", record.id),
                })?;
                if self.hooks.tx_lin(lin_num, &record.payload()?) {
                    self.summary.lin_forwarded += 1;
                    Ok(Some(Outcome::Forwarded))
                } else {
                    self.summary.lin_dropped += 1;
                    Ok(Some(Outcome::Dropped))
                }
            }
        }
    }

    /// Replay every record from `reader`, calling `on_verdict` for each
    /// outbound record.  Stops early once `shutdown` is set.
    pub fn run<R: BufRead>(
        mut self,
        reader: R,
        shutdown: &AtomicBool,
        mut on_verdict: impl FnMut(&Record, Outcome),
    ) -> Result<Summary, GateError> {
        for (idx, line) in reader.lines().enumerate() {
            if shutdown.load(Ordering::SeqCst) {
                info!(line = idx + 1, "replay interrupted");
                self.summary.interrupted = true;
                break;
            }
            let line = line.map_err(|e| GateError::Io(e.to_string()))?;
            let text = line.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            let record = Record::parse(idx + 1, text)?;
            let outcome = self.step(&record).map_err(|e| match e {
                GateError::Replay { details, .. } => GateError::Replay {
                    line: idx + 1,
                    details,
                },
                other => GateError::Replay {
                    line: idx + 1,
                    details: other.to_string(),
                },
            })?;
            if let Some(outcome) = outcome {
                on_verdict(&record, outcome);
            }
        }
        Ok(self.summary)
    }
}
