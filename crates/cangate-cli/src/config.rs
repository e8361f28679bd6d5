//! Gate configuration – reads `~/.cangate/config.toml`.
//!
//! Only the session parameters live here.  The numeric limits are compiled
//! in ([`LimitConfig::HYUNDAI`][cangate_kernel::LimitConfig::HYUNDAI]).

use cangate_types::{GateError, SafetyMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Safety model to run.
    #[serde(default)]
    pub mode: SafetyMode,

    /// EPS torque scale factor in percent, passed to `init`.
    #[serde(default = "default_torque_scale_factor")]
    pub torque_scale_factor: i16,

    /// Apply absolute and rate limits while engaged.
    #[serde(default = "default_actuation_limits")]
    pub actuation_limits: bool,
}

fn default_torque_scale_factor() -> i16 {
    128
}
fn default_actuation_limits() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: SafetyMode::default(),
            torque_scale_factor: default_torque_scale_factor(),
            actuation_limits: default_actuation_limits(),
        }
    }
}

/// Return the path to `~/.cangate/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".cangate").join("config.toml")
}

/// Load the config from `path`, falling back to defaults when the file does
/// not exist.  Environment overrides are applied either way.
pub fn load_or_default(path: &Path) -> Result<Config, GateError> {
    let mut cfg = load_from(path)?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load the config from a specific path.  Returns `None` if the file does
/// not exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, GateError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        GateError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| GateError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
    Ok(Some(cfg))
}

/// Apply `CANGATE_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `CANGATE_MODE` | `mode` (`hyundai` / `no_output`) |
/// | `CANGATE_TORQUE_SCALE_FACTOR` | `torque_scale_factor` |
/// | `CANGATE_ACTUATION_LIMITS` | `actuation_limits` (`true` / `false`) |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("CANGATE_MODE") {
        match v.as_str() {
            "hyundai" => cfg.mode = SafetyMode::Hyundai,
            "no_output" => cfg.mode = SafetyMode::NoOutput,
            _ => {}
        }
    }
    if let Ok(v) = std::env::var("CANGATE_TORQUE_SCALE_FACTOR")
        && let Ok(factor) = v.parse::<i16>()
    {
        cfg.torque_scale_factor = factor;
    }
    if let Ok(v) = std::env::var("CANGATE_ACTUATION_LIMITS")
        && let Ok(enabled) = v.parse::<bool>()
    {
        cfg.actuation_limits = enabled;
    }
}
