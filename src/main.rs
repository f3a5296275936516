use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use gridlock::{execute, Granularity, RunConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridlock")]
#[command(about = "Concurrent grid swaps under a selectable lock granularity", long_about = None)]
struct Cli {
    /// Grid side length (1-10)
    grid_size: usize,

    /// Number of worker threads (1-1000)
    threads: usize,

    /// Lock granularity: grid, row, cell, or none
    granularity: Granularity,

    /// Seed for deterministic grid fill and swap selection
    #[arg(long)]
    seed: Option<u64>,

    /// Milliseconds to hold cell values between a swap's reads and writes
    #[arg(long, value_name = "MS")]
    hold: Option<u64>,

    /// Emit the run report as JSON instead of the console dump
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Suppress the initial and final grid dumps
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = RunConfig {
        grid_size: cli.grid_size,
        threads: cli.threads,
        granularity: cli.granularity,
        seed: cli.seed,
        hold: cli.hold.map(Duration::from_millis),
    };

    let report = execute(&config).context("run failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if cli.quiet {
        println!("Initial Sum:  {}", report.initial_sum);
        println!("Final Sum:  {}", report.final_sum);
        println!("{}", report.verdict());
        println!("Secs elapsed:  {:.3}", report.elapsed.as_secs_f64());
    } else {
        print!("{report}");
    }

    Ok(())
}
