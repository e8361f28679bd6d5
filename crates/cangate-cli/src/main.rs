//! `cangate` – replay recorded bus traffic through the safety gate.
//!
//! 1. Loads `~/.cangate/config.toml` (or `--config`), applying `CANGATE_*`
//!    environment overrides.
//! 2. `replay <log>` feeds every record of a frame log through the configured
//!    safety hooks and prints the verdict for each outbound frame.
//! 3. `limits` prints the compiled-in limit table.
//! 4. Ctrl-C stops a replay after the current record; the summary is still
//!    printed.

mod config;
mod replay;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cangate_kernel::{LimitConfig, ManualClock, hooks_for};
use cangate_types::{GateError, SafetyMode};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{error, warn};

use crate::replay::{Direction, Outcome, Replay, Summary};

#[derive(Parser)]
#[command(name = "cangate")]
#[command(about = "Actuation command safety gate - replay and inspect")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.cangate/config.toml)
    #[arg(long, global = true, env = "CANGATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a newline-delimited JSON frame log through the gate
    Replay {
        /// Path to the log
        log: PathBuf,

        /// Print only the summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the effective limits
    Limits,
}

fn main() -> ExitCode {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG filters (default "info"); CANGATE_LOG_FORMAT=json switches to
    // newline-delimited JSON.  Verdict output below still goes to stdout.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("CANGATE_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(config::config_path);
    let cfg = match config::load_or_default(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Replay { log, quiet } => run_replay(&cfg, &log, quiet),
        Commands::Limits => {
            print_limits(&cfg);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Replay
// ─────────────────────────────────────────────────────────────────────────────

fn run_replay(cfg: &config::Config, log: &Path, quiet: bool) -> Result<(), GateError> {
    let file = File::open(log)
        .map_err(|e| GateError::Io(format!("failed to open {}: {}", log.display(), e)))?;

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; replay cannot be interrupted cleanly");
    }

    let clock = ManualClock::new(0);
    let mut hooks = hooks_for(cfg.mode, Box::new(clock.clone()));
    hooks.init(cfg.torque_scale_factor);
    hooks.set_actuation_limits(cfg.actuation_limits);

    println!(
        "  Replaying {} ({} mode, scale {}%, limits {})",
        log.display().to_string().bold(),
        cfg.mode.to_string().cyan(),
        cfg.torque_scale_factor,
        if cfg.actuation_limits { "on".green() } else { "off".yellow() }
    );

    let summary = Replay::new(hooks, clock).run(BufReader::new(file), &shutdown, |record, outcome| {
        if quiet {
            return;
        }
        let verdict = match outcome {
            Outcome::Forwarded => "FORWARD".green(),
            Outcome::Dropped => "DROP".red().bold(),
        };
        let target = match record.dir {
            Direction::Lin => format!("lin{}", record.id),
            _ => format!("bus{} {:#05x}", record.bus, record.id),
        };
        println!(
            "  {:>10}us  {:<14} {:<16} {}",
            record.t_us,
            target,
            record.data.dimmed(),
            verdict
        );
    })?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &Summary) {
    println!();
    if summary.interrupted {
        println!("{}", "  ⚠  Replay interrupted".yellow().bold());
    }
    println!("  Frames ingested : {}", summary.ingested);
    println!("  Forwarded       : {}", summary.forwarded.to_string().green());
    println!("  Dropped         : {}", summary.dropped.to_string().red());
    if summary.lin_forwarded + summary.lin_dropped > 0 {
        println!(
            "  LIN             : {} forwarded, {} dropped",
            summary.lin_forwarded, summary.lin_dropped
        );
    }
    for (id, count) in &summary.dropped_by_id {
        println!("    {:#05x} : {}", id, count);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Limits
// ─────────────────────────────────────────────────────────────────────────────

fn print_limits(cfg: &config::Config) {
    println!();
    println!("  {} {}", "Safety mode:".bold(), cfg.mode.to_string().cyan());
    if cfg.mode == SafetyMode::NoOutput {
        println!("  Every outbound frame is refused.");
        return;
    }

    let limits = LimitConfig::HYUNDAI.with_torque_scale_factor(cfg.torque_scale_factor);
    let rows = [
        ("max_torque", limits.max_torque.to_string()),
        ("max_rate_up", limits.max_rate_up.to_string()),
        ("max_rate_down", limits.max_rate_down.to_string()),
        ("max_torque_error", limits.max_torque_error.to_string()),
        ("max_rt_delta", limits.max_rt_delta.to_string()),
        ("rt_interval", format!("{} us", limits.rt_interval_us)),
        ("max_accel", limits.max_accel.to_string()),
        ("min_accel", limits.min_accel.to_string()),
        ("torque_scale_factor", format!("{}%", limits.torque_scale_factor)),
        ("actuation_limits", cfg.actuation_limits.to_string()),
    ];
    for (name, value) in rows {
        println!("    {:<20} {}", name, value.bold());
    }
    println!();
}
