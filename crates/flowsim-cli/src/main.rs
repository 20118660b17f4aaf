//! `flowsim` — the thin external wrapper around the simulation core: reads
//! a TOML run spec, builds a topology + workload + controller set, runs
//! the simulation, and dumps traces/metrics to disk.

mod config;
mod output;
mod runner;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use config::RunConfigInput;

/// Run the SDN controller load-balancing simulator.
#[derive(Parser, Debug)]
#[command(name = "flowsim", about = "SDN controller load-balancing simulator")]
struct Cli {
    /// Path to a TOML run spec. Omit to run with every default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the run spec's `run_name` (and the `logs/<run_name>.*` file stem).
    #[arg(long)]
    run_name: Option<String>,
}

fn main() -> Result<()> {
    flowsim_core::init();
    let cli = Cli::parse();

    let raw = match &cli.config {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        None => String::new(),
    };
    let mut input = RunConfigInput::from_toml_str(&raw).context("parsing run spec")?;
    if let Some(name) = cli.run_name {
        input.run_name = Some(name);
    }
    let config = input.resolve().context("resolving run spec")?;

    tracing::info!(run_name = %config.run_name, "starting simulation run");
    let (prepared, metrics) = runner::run(&config)?;

    let newworkload = prepared.was_legacy.then_some(prepared.canonical.as_slice());
    output::write_run(
        &config.out_dir,
        &config.run_name,
        &prepared.canonical,
        newworkload,
        &metrics,
    )?;

    tracing::info!(
        ticks = metrics.rmse_links.len(),
        total_requests = prepared.canonical.len(),
        "simulation run complete"
    );
    Ok(())
}
