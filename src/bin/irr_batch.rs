//! Solve IRR for every series in a CSV file
//!
//! Usage: irr_batch <cashflows.csv> [--method bisection|newton|auto]
//!
//! Each CSV row is `id,cf0,cf1,...`. Series are solved in parallel and one
//! JSON object per series is printed to stdout, in file order.
//! Solver settings come from IRR_* environment variables.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use npv_irr::cashflows::{load_series, NamedSeries};
use npv_irr::irr::{solve_batch, IrrSolver};
use npv_irr::SolverSettings;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "irr_batch")]
#[command(about = "Solve IRR for every series in a CSV file")]
struct Args {
    /// CSV file, one `id,cf0,cf1,...` row per series
    path: PathBuf,

    #[arg(short, long, value_enum, default_value = "auto")]
    method: Method,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum Method {
    Bisection,
    Newton,
    /// Newton-Raphson, then bisection if it fails
    Auto,
}

#[derive(Serialize)]
struct BatchRow<'a> {
    id: &'a str,
    irr: Option<f64>,
    iterations: Option<u32>,
    error: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let path = &args.path;

    let settings = SolverSettings::from_env();
    let solver: Box<dyn IrrSolver> = match args.method {
        Method::Bisection => Box::new(settings.bisection()),
        Method::Newton => Box::new(settings.newton()),
        Method::Auto => Box::new(settings.fallback()),
    };

    let start = Instant::now();
    let all: Vec<NamedSeries> = load_series(path).with_context(|| format!("Failed to load {}", path.display()))?;
    log::info!("Loaded {} series in {:?}", all.len(), start.elapsed());

    let flows: Vec<&[f64]> = all.iter().map(|named| named.series.as_slice()).collect();
    let solve_start = Instant::now();
    let results = solve_batch(solver.as_ref(), &flows);
    log::info!("Solved {} series with {} in {:?}", results.len(), solver.name(), solve_start.elapsed());

    let mut failures = 0;
    for (named, result) in all.iter().zip(&results) {
        let row = match result {
            Ok(solution) => BatchRow {
                id: &named.id,
                irr: Some(solution.rate),
                iterations: Some(solution.iterations),
                error: None,
            },
            Err(e) => {
                failures += 1;
                BatchRow {
                    id: &named.id,
                    irr: None,
                    iterations: None,
                    error: Some(e.to_string()),
                }
            }
        };
        println!("{}", serde_json::to_string(&row)?);
    }

    if failures > 0 {
        log::warn!("{} of {} series had no IRR", failures, all.len());
    }

    Ok(())
}
