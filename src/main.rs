//! Worldline - Entry Point
//!
//! CLI for single seeded runs and Monte-Carlo sweeps. All output
//! beyond the structured JSON report is human-oriented diagnostics.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use worldline::core::error::Result;
use worldline::montecarlo::{self, classify};
use worldline::phases::standard_pipeline;
use worldline::scenario::Scenario;
use worldline::scheduler::{RunOptions, Termination};
use worldline::state::SimulationState;

#[derive(Parser)]
#[command(name = "worldline", about = "Month-stepped global catastrophe simulator")]
struct Cli {
    /// Verbose logging (phase-level diagnostics)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single seeded simulation
    Run {
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 600)]
        months: u32,
        /// TOML scenario file with initial-state overrides
        #[arg(long)]
        scenario: Option<PathBuf>,
        /// Write a JSON report (final state + event log) here
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Run a Monte-Carlo sweep of independent seeded simulations
    Sweep {
        #[arg(long, default_value_t = 1000)]
        runs: u32,
        #[arg(long, default_value_t = 1)]
        base_seed: u64,
        #[arg(long, default_value_t = 600)]
        months: u32,
        #[arg(long)]
        scenario: Option<PathBuf>,
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn load_scenario(path: &Option<PathBuf>) -> Result<Scenario> {
    match path {
        Some(path) => Scenario::load(path),
        None => Ok(Scenario::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "worldline=debug" } else { "worldline=info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Run { seed, months, scenario, report } => {
            let scenario = load_scenario(&scenario)?;
            let mut state = SimulationState::default();
            scenario.apply(&mut state)?;

            let mut scheduler = standard_pipeline()?;
            let rng = ChaCha8Rng::seed_from_u64(seed);
            let outcome = scheduler.run(state, rng, RunOptions::months(months))?;

            println!("=== WORLDLINE RUN (seed {seed}) ===");
            println!("outcome:            {}", classify(&outcome));
            match outcome.termination {
                Termination::Completed => {
                    println!("months simulated:   {}", outcome.months_run)
                }
                Termination::Extinct { month } => {
                    println!("extinct at month:   {month}")
                }
                Termination::LockedIn { month } => {
                    println!("locked in at month: {month}")
                }
            }
            let ledger = &outcome.final_state.ledger;
            println!("final population:   {:.3}B", ledger.population);
            println!("peak population:    {:.3}B", ledger.peak_population);
            println!("crisis deaths:      {:.3}B", ledger.cumulative_crisis_deaths);
            println!("safeguard strength: {:.3}", outcome.final_state.deterrence.chain.aggregate_strength());
            println!();
            println!("deaths by category:");
            for (category, deaths) in &ledger.deaths_by_category {
                if *deaths > 0.0 {
                    println!("  {category:?}: {deaths:.4}B");
                }
            }
            println!("events logged: {}", outcome.log.events.len());

            if let Some(path) = report {
                let report = serde_json::json!({
                    "seed": seed,
                    "termination": outcome.termination,
                    "months_run": outcome.months_run,
                    "final_state": outcome.final_state,
                    "events": outcome.log,
                });
                std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
                println!("report written to {}", path.display());
            }
        }
        Command::Sweep { runs, base_seed, months, scenario, report } => {
            let scenario = load_scenario(&scenario)?;
            let summary = montecarlo::sweep(runs, base_seed, months, &scenario)?;

            println!("=== WORLDLINE SWEEP ({runs} runs, base seed {base_seed}) ===");
            println!("stabilized:  {}", summary.stabilized);
            println!("bottleneck:  {}", summary.bottlenecks);
            println!("escalation:  {}", summary.escalations);
            println!("extinction:  {}", summary.extinctions);
            println!(
                "final population p10/median/p90: {:.2}B / {:.2}B / {:.2}B",
                summary.p10_final_population,
                summary.median_final_population,
                summary.p90_final_population
            );

            if let Some(path) = report {
                std::fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
                println!("report written to {}", path.display());
            }
        }
    }

    Ok(())
}
