use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Gridlock workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run repeated trials across every granularity and report verdicts
    Trials {
        /// Trials per granularity
        #[arg(long, default_value_t = 50)]
        trials: usize,

        /// Grid side length passed to every trial
        #[arg(long, default_value_t = 4)]
        grid_size: usize,

        /// Worker count passed to every trial
        #[arg(long, default_value_t = 64)]
        threads: usize,

        /// Hold window (ms) inside each swap, widening the race window
        #[arg(long, default_value_t = 1)]
        hold: u64,
    },
}

const GRANULARITIES: &[&str] = &["grid", "row", "cell", "none"];

/// The subset of the binary's JSON report the sweep needs.
#[derive(Deserialize)]
struct TrialReport {
    initial_sum: i64,
    final_sum: i64,
    elapsed: Duration,
}

struct Summary {
    granularity: &'static str,
    trials: usize,
    violations: usize,
    mean_elapsed: Duration,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Trials {
            trials,
            grid_size,
            threads,
            hold,
        } => {
            let summaries = run_trials(trials, grid_size, threads, hold)?;
            write_report(&summaries, grid_size, threads, hold)?;
        }
    }

    Ok(())
}

fn run_trials(trials: usize, grid_size: usize, threads: usize, hold: u64) -> Result<Vec<Summary>> {
    println!("Building release binary...");
    let status = Command::new("cargo")
        .args(["build", "--release", "--bin", "gridlock"])
        .status()?;
    if !status.success() {
        anyhow::bail!("Failed to build the gridlock binary");
    }

    let binary = Path::new("target/release/gridlock");
    let mut summaries = Vec::with_capacity(GRANULARITIES.len());

    for granularity in GRANULARITIES {
        println!("\n>>> {trials} trials at granularity: {granularity}");
        let start = Instant::now();

        let mut violations = 0;
        let mut total_elapsed = Duration::ZERO;

        for trial in 0..trials {
            let output = Command::new(binary)
                .arg(grid_size.to_string())
                .arg(threads.to_string())
                .arg(granularity)
                .args(["--hold", &hold.to_string(), "--json", "--quiet"])
                .output()
                .context(format!("failed to run trial {trial} for {granularity}"))?;

            if !output.status.success() {
                anyhow::bail!(
                    "trial {trial} for {granularity} exited with {}",
                    output.status
                );
            }

            let report: TrialReport = serde_json::from_slice(&output.stdout)
                .context(format!("unparseable report from trial {trial}"))?;

            if report.initial_sum != report.final_sum {
                violations += 1;
            }
            total_elapsed += report.elapsed;
        }

        println!(
            "Finished {granularity}: {violations}/{trials} violations in {:.2?}",
            start.elapsed()
        );

        summaries.push(Summary {
            granularity,
            trials,
            violations,
            mean_elapsed: total_elapsed / trials.max(1) as u32,
        });
    }

    Ok(summaries)
}

fn write_report(summaries: &[Summary], grid_size: usize, threads: usize, hold: u64) -> Result<()> {
    println!("\n>>> Generating Report...");

    let report_path = Path::new("trial_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }

    use std::io::Write;
    let mut file = fs::File::create(report_path)?;

    writeln!(file, "# Granularity Trial Report")?;
    writeln!(file)?;
    writeln!(
        file,
        "Grid {grid_size}x{grid_size}, {threads} workers, {hold} ms hold window."
    )?;
    writeln!(file)?;
    writeln!(file, "| Granularity | Trials | Violations | Rate | Mean Elapsed |")?;
    writeln!(file, "|---|---|---|---|---|")?;

    for s in summaries {
        let rate = if s.trials > 0 {
            s.violations as f64 / s.trials as f64
        } else {
            0.0
        };
        writeln!(
            file,
            "| {} | {} | {} | {:.0}% | {:.1?} |",
            s.granularity,
            s.trials,
            s.violations,
            rate * 100.0,
            s.mean_elapsed,
        )?;
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}
