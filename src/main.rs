//! NPV/IRR CLI
//!
//! Command-line interface for NPV, IRR, NPV curves and option payoffs.
//! Solver defaults can be set through IRR_* environment variables
//! (see `npv_irr::config`); flags take precedence.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use npv_irr::cashflows::{parse_cash_flows, parse_rate};
use npv_irr::irr::{IrrSolution, IrrSolver};
use npv_irr::payoff::{compute_payoff, OptionType, Position};
use npv_irr::valuation::{npv_with_initial_investment, CurveComparison, DEFAULT_RATE_MAX, DEFAULT_RATE_MIN, DEFAULT_STEPS};
use npv_irr::{npv, CashFlowSeries, SolverSettings};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "npv-irr")]
#[command(about = "Net present value and internal rate of return calculator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Net present value of a cash-flow list at a rate
    Npv {
        /// Cash flows, e.g. "[-1000, 400, 500, 600]" or "-1000,400,500,600"
        #[arg(allow_hyphen_values = true)]
        cash_flows: String,

        /// Discount rate: 15%, 15 or 0.15
        #[arg(short, long, allow_hyphen_values = true)]
        rate: String,

        /// Treat the cash flows as periods 1..n after this positive outlay
        #[arg(long)]
        initial_investment: Option<f64>,
    },

    /// Internal rate of return
    Irr {
        #[arg(allow_hyphen_values = true)]
        cash_flows: String,

        #[arg(short, long, value_enum, default_value = "auto")]
        method: Method,

        #[command(flatten)]
        solver: SolverArgs,

        /// Print the full solution as JSON
        #[arg(long)]
        json: bool,
    },

    /// NPV sampled over a rate range, with IRR
    Curve {
        #[arg(allow_hyphen_values = true)]
        cash_flows: String,

        /// Second cash-flow list to compare against
        #[arg(long, allow_hyphen_values = true)]
        compare: Option<String>,

        #[arg(long, default_value_t = DEFAULT_RATE_MIN, allow_hyphen_values = true)]
        rate_min: f64,

        #[arg(long, default_value_t = DEFAULT_RATE_MAX, allow_hyphen_values = true)]
        rate_max: f64,

        #[arg(long, default_value_t = DEFAULT_STEPS)]
        steps: usize,

        /// Save curve data as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Save curve data as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        #[command(flatten)]
        solver: SolverArgs,
    },

    /// Net option payoff at expiry
    Payoff {
        #[arg(long = "type", value_enum)]
        option_type: OptionKind,

        #[arg(long, value_enum)]
        position: Side,

        #[arg(long)]
        strike: f64,

        #[arg(long)]
        price_at_expiry: f64,

        /// Premium paid (long) or received (short)
        #[arg(long, default_value_t = 0.0, value_parser = non_negative)]
        premium: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    Bisection,
    Newton,
    /// Newton-Raphson, then bisection if it fails
    Auto,
}

#[derive(Clone, Copy, ValueEnum)]
enum OptionKind {
    Call,
    Put,
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Long,
    Short,
}

/// Overrides on top of the environment-derived solver settings
#[derive(clap::Args)]
struct SolverArgs {
    #[arg(long)]
    tolerance: Option<f64>,

    #[arg(long)]
    max_iter: Option<u32>,

    /// Bisection lower bound
    #[arg(long, allow_hyphen_values = true)]
    low: Option<f64>,

    /// Bisection upper bound
    #[arg(long, allow_hyphen_values = true)]
    high: Option<f64>,

    /// Newton-Raphson starting guess
    #[arg(long, allow_hyphen_values = true)]
    initial_rate: Option<f64>,
}

impl SolverArgs {
    fn settings(&self) -> SolverSettings {
        let mut settings = SolverSettings::from_env();
        if let Some(tolerance) = self.tolerance {
            settings.tolerance = tolerance;
        }
        if let Some(max_iter) = self.max_iter {
            settings.max_iterations = max_iter;
        }
        if let Some(low) = self.low {
            settings.low = low;
        }
        if let Some(high) = self.high {
            settings.high = high;
        }
        if let Some(initial_rate) = self.initial_rate {
            settings.initial_rate = initial_rate;
        }
        settings
    }
}

#[derive(Serialize)]
struct IrrResponse<'a> {
    method: &'a str,
    cash_flows: &'a [f64],
    #[serde(flatten)]
    solution: IrrSolution,
}

fn non_negative(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if value < 0.0 {
        return Err("premium must not be negative".to_string());
    }
    Ok(value)
}

fn read_series(text: &str) -> Result<CashFlowSeries> {
    let flows = parse_cash_flows(text)?;
    Ok(CashFlowSeries::new(flows)?)
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Npv {
            cash_flows,
            rate,
            initial_investment,
        } => {
            let rate = parse_rate(&rate)?;
            let value = match initial_investment {
                Some(outlay) => npv_with_initial_investment(outlay, &parse_cash_flows(&cash_flows)?, rate)?,
                None => npv(&read_series(&cash_flows)?, rate)?,
            };
            println!("NPV: {:.2}", value);
        }

        Commands::Irr {
            cash_flows,
            method,
            solver,
            json,
        } => {
            let series = read_series(&cash_flows)?;
            let settings = solver.settings();
            let chosen: Box<dyn IrrSolver> = match method {
                Method::Bisection => Box::new(settings.bisection()),
                Method::Newton => Box::new(settings.newton()),
                Method::Auto => Box::new(settings.fallback()),
            };

            let solution = chosen
                .solve(&series)
                .with_context(|| format!("{} found no IRR", chosen.name()))?;

            if json {
                let response = IrrResponse {
                    method: chosen.name(),
                    cash_flows: series.as_slice(),
                    solution,
                };
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("IRR: {:.6} ({:.4}%)", solution.rate, solution.rate * 100.0);
                log::info!("{} iterations, residual {:.3e}", solution.iterations, solution.residual);
            }
        }

        Commands::Curve {
            cash_flows,
            compare,
            rate_min,
            rate_max,
            steps,
            json,
            csv,
            solver,
        } => {
            let primary = read_series(&cash_flows)?;
            let other = compare.as_deref().map(read_series).transpose()?;
            let curves = CurveComparison::compare(&primary, other.as_ref(), rate_min, rate_max, steps, &solver.settings())?;

            match curves.primary.irr {
                Some(irr) => println!("IRR: {:.3}", irr),
                None => println!("No primary IRR found."),
            }
            if let Some(cmp) = &curves.compare {
                match cmp.irr {
                    Some(irr) => println!("IRR2: {:.3}", irr),
                    None => println!("No compare IRR found."),
                }
            }

            if json.is_none() && csv.is_none() {
                println!("{:>12} {:>16}", "Rate", "NPV");
                for (rate, value) in curves.primary.rates.iter().zip(&curves.primary.npvs) {
                    println!("{:>12.6} {:>16.2}", rate, value);
                }
            }
            if let Some(path) = json {
                let file = File::create(&path).with_context(|| format!("unable to create {}", path.display()))?;
                serde_json::to_writer_pretty(BufWriter::new(file), &curves)?;
                println!("Curve data written to: {}", path.display());
            }
            if let Some(path) = csv {
                let file = File::create(&path).with_context(|| format!("unable to create {}", path.display()))?;
                curves.write_csv(BufWriter::new(file))?;
                println!("Curve data written to: {}", path.display());
            }
        }

        Commands::Payoff {
            option_type,
            position,
            strike,
            price_at_expiry,
            premium,
        } => {
            if !(strike.is_finite() && price_at_expiry.is_finite()) {
                bail!("strike and price at expiry must be finite numbers");
            }
            let option_type = match option_type {
                OptionKind::Call => OptionType::Call,
                OptionKind::Put => OptionType::Put,
            };
            let position = match position {
                Side::Long => Position::Long,
                Side::Short => Position::Short,
            };
            let payoff = compute_payoff(option_type, position, strike, price_at_expiry, premium);
            println!("[{:?} {:?}] Payoff: ${:.2} -> {}", position, option_type, payoff.amount, payoff.outcome);
        }
    }

    Ok(())
}
