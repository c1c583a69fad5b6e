mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::loan::{LoanArgs, ScheduleArgs};

/// Loan amortization and payoff projections
#[derive(Parser)]
#[command(
    name = "payoff",
    version,
    about = "Loan amortization and payoff projections",
    long_about = "Projects a loan's amortization schedule with and without recurring extra \
                  payments and one-off lump sums, with decimal precision. Reports interest \
                  saved, periods saved, payoff date, and the savings attributable to each \
                  lump sum."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log projection details to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full projection: baseline vs. optimized schedules and savings
    Project(LoanArgs),
    /// Print one amortization schedule, one row per payment
    Schedule(ScheduleArgs),
    /// Interest and time saved by each lump sum
    Impacts(LoanArgs),
    /// Payments aggregated by calendar year
    Yearly(ScheduleArgs),
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

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Project(args) => commands::loan::run_project(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Impacts(args) => commands::loan::run_impacts(args),
        Commands::Yearly(args) => commands::loan::run_yearly(args),
        Commands::Version => {
            println!("payoff {}", env!("CARGO_PKG_VERSION"));
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
