//! Headless tactics battle runner.
//!
//! Runs combat scenarios without any UI, for CI testing, balance
//! sweeps, and replay verification.
//!
//! # Usage
//!
//! ```bash
//! # Run the built-in skirmish under seed 0
//! cargo run -p tactics_headless -- run
//!
//! # Run a scenario file with a chosen seed, emitting the event log as JSON lines
//! cargo run -p tactics_headless -- run --scenario duel.ron --seed 7 --json
//!
//! # Run a 1000-game balance batch
//! cargo run -p tactics_headless -- batch --scenario duel.ron --count 1000
//! ```
//!
//! Output (stdout): JSON events and summaries.
//! Logs (stderr): tracing output, filtered by `RUST_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tactics_headless::batch::{run_batch, BatchConfig};
use tactics_headless::runner::run_scenario;
use tactics_headless::scenario::Scenario;

#[derive(Parser)]
#[command(name = "tactics_headless")]
#[command(about = "Headless tactics battle runner for CI and balance testing")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one battle and print its outcome.
    Run {
        /// Scenario RON file; omit for the built-in skirmish.
        #[arg(long)]
        scenario: Option<PathBuf>,
        /// RNG seed.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Print every event as a JSON line before the summary.
        #[arg(long)]
        json: bool,
    },
    /// Run many seeds of a scenario and report win rates.
    Batch {
        /// Scenario RON file; omit for the built-in skirmish.
        #[arg(long)]
        scenario: Option<PathBuf>,
        /// Number of battles.
        #[arg(long, default_value_t = 100)]
        count: u32,
        /// Seed of the first battle.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn load_scenario(path: Option<&PathBuf>) -> Result<Scenario, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Scenario::load(path)?),
        None => Ok(Scenario::default()),
    }
}

fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Run {
            scenario,
            seed,
            json,
        } => {
            let scenario = load_scenario(scenario.as_ref())?;
            let outcome = run_scenario(&scenario, seed)?;

            if json {
                for event in &outcome.events {
                    println!("{}", serde_json::to_string(event)?);
                }
            }
            let summary = serde_json::json!({
                "scenario": scenario.name,
                "seed": outcome.seed,
                "rounds": outcome.rounds,
                "winner": outcome.winner,
                "survivors": outcome.survivors,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Batch {
            scenario,
            count,
            seed,
        } => {
            let scenario = load_scenario(scenario.as_ref())?;
            let config = BatchConfig {
                count,
                seed_start: seed,
            };
            let results = run_batch(&scenario, &config)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
