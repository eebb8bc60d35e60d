#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Arena Combat sessions headlessly.

mod autopilot;
mod config;

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use arena_combat_core::CompletionPolicy;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use crate::autopilot::{RunLimits, RunReport};

/// Command-line arguments for the headless runner.
#[derive(Debug, Parser)]
#[command(
    name = "arena-combat",
    about = "Runs an Arena Combat session with a scripted player"
)]
struct CliArgs {
    /// TOML file with session tuning; defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Overrides the seed used for wave rolls and spawn placement.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of waves to complete before stopping.
    #[arg(long, default_value_t = 5)]
    waves: u32,
    /// Upper bound on simulated ticks.
    #[arg(long, default_value_t = 60_000)]
    max_ticks: u64,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Overrides how kills complete a wave.
    #[arg(long, value_enum)]
    completion: Option<CompletionArg>,
    /// Prints the report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CompletionArg {
    /// The first kill of a wave completes it.
    AnyKill,
    /// A wave completes once every spawned enemy is dead.
    RemainingCount,
}

impl From<CompletionArg> for CompletionPolicy {
    fn from(value: CompletionArg) -> Self {
        match value {
            CompletionArg::AnyKill => CompletionPolicy::AnyKill,
            CompletionArg::RemainingCount => CompletionPolicy::RemainingCount,
        }
    }
}

/// Entry point for the Arena Combat command-line interface.
fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    ensure!(args.frame_ms > 0, "--frame-ms must be greater than zero");

    let mut session_config = config::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        session_config.seed = seed;
    }
    if let Some(completion) = args.completion {
        session_config.difficulty.completion_policy = completion.into();
    }

    let limits = RunLimits {
        waves: args.waves,
        max_ticks: args.max_ticks,
        frame: Duration::from_millis(args.frame_ms),
    };
    let report = autopilot::run(session_config, limits)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{json}");
    } else {
        print_text(&report);
    }
    Ok(())
}

fn print_text(report: &RunReport) {
    let summary = &report.summary;
    println!("{}", report.progress);
    println!(
        "waves completed: {}/{}",
        report.waves_completed, report.target_waves
    );
    println!("kills: {}  score: {}", summary.kills, summary.score);
    println!(
        "damage taken: {:.1}  survived: {}",
        summary.damage_taken, summary.survived
    );
    println!("ticks: {}", summary.ticks);
}
