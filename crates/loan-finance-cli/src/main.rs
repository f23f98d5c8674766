mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::financing::{AmortizeArgs, CompareFeesArgs, EffectiveRateArgs, SummaryArgs};
use loan_finance_core::financing::SolverConfig;

/// Loan amortization and effective-rate calculations
#[derive(Parser)]
#[command(
    name = "loancalc",
    version,
    about = "Loan amortization and effective-rate calculations",
    long_about = "A CLI for pricing fixed-rate monthly loans with decimal precision. \
                  Produces the periodic payment, the amortization schedule, and the \
                  effective annual rate (IRR) including origination and periodic fees."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// JSON or YAML file overriding the effective-rate solver settings
    #[arg(long, global = true)]
    solver_config: Option<String>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Periodic payment and month-by-month amortization schedule
    Amortize(AmortizeArgs),
    /// Effective annual rate (IRR) including fees
    EffectiveRate(EffectiveRateArgs),
    /// Full loan summary: payment, totals, effective rate and schedule
    Summary(SummaryArgs),
    /// Compare financing the origination fee against paying it up front
    CompareFees(CompareFeesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn load_solver_config(
    path: Option<&str>,
) -> Result<Option<SolverConfig>, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let config: SolverConfig = input::file::read_input(path)?;
    config.validate()?;
    log::debug!("solver config loaded from {path}: {config:?}");
    Ok(Some(config))
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let solver = match load_solver_config(cli.solver_config.as_deref()) {
        Ok(solver) => solver,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    let solver_or_default = solver.clone().unwrap_or_default();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::financing::run_amortize(args),
        Commands::EffectiveRate(args) => {
            commands::financing::run_effective_rate(args, &solver_or_default)
        }
        Commands::Summary(args) => commands::financing::run_summary(args, solver),
        Commands::CompareFees(args) => {
            commands::financing::run_compare_fees(args, &solver_or_default)
        }
        Commands::Version => {
            println!("loancalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
