//! `cangate-kernel` – Actuation Command Safety Gate
//!
//! Sits between the driving computer and the vehicle's actuation bus.  It
//! does not plan or steer; it decides, frame by frame, whether a command is
//! allowed to reach the vehicle.
//!
//! # Modules
//!
//! - [`limits`] – [`LimitConfig`][limits::LimitConfig]: absolute, rate and
//!   real-time bounds.
//! - [`sample`] – [`SampleWindow`][sample::SampleWindow]: the last three
//!   measured motor torques.
//! - [`state`] – [`SafetyState`][state::SafetyState]: engagement flag and
//!   torque history.
//! - [`codec`] – typed decode of the few frame fields the gate reads.
//! - [`ingest`] – telemetry ingestion; never rejects.
//! - [`checks`] – pure limit predicates.
//! - [`validator`] – the accept/reject decision for outbound frames.
//! - [`clock`] – wrapping microsecond timestamps.
//! - [`gate`] – [`SafetyGate`][gate::SafetyGate]: the hook table
//!   (`init` / `rx` / `tx` / `tx_lin` / `fwd`) tying it all together.

pub mod checks;
pub mod clock;
pub mod codec;
pub mod gate;
pub mod ingest;
pub mod limits;
pub mod sample;
pub mod state;
pub mod validator;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use gate::{NoOutputHooks, SafetyGate, SafetyHooks, hooks_for};
pub use limits::LimitConfig;
pub use sample::SampleWindow;
pub use state::SafetyState;
