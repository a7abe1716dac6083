mod commands;
mod config;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::finder::FinderArgs;
use commands::instruments::InstrumentsArgs;
use commands::recommend::RecommendArgs;
use commands::schedule::ScheduleArgs;
use commands::stack::StackArgs;
use commands::Context;
use config::CliConfig;

/// Capital stack projections and financing instrument recommendations
#[derive(Parser)]
#[command(
    name = "cstack",
    version,
    about = "Capital stack projections and financing instrument recommendations",
    long_about = "Builds month-by-month repayment schedules for layered financing \
                  (debt, equity, grants, revenue-based capital), projects them onto a \
                  shared timeline, and ranks funding instruments against a short \
                  questionnaire about the organization."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Reference month (YYYY-MM) for default start dates; defaults to the current month
    #[arg(long, global = true)]
    as_of: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Payment schedule for a single financing layer
    Schedule(ScheduleArgs),
    /// Project a whole capital stack onto a shared timeline
    Stack(StackArgs),
    /// Rank financing instruments against questionnaire answers
    Recommend(RecommendArgs),
    /// Work through the questionnaire one step at a time
    Finder(FinderArgs),
    /// List the built-in instrument catalogs
    Instruments(InstrumentsArgs),
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

fn context(as_of: Option<&str>) -> Result<Context, Box<dyn std::error::Error>> {
    let config = CliConfig::load()?;
    if let Err(e) = telemetry::init(&config.log_filter) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }
    let reference = config::reference_month(as_of)?;
    tracing::debug!(state_dir = %config.state_dir.display(), %reference, "cli context ready");
    Ok(Context { config, reference })
}

fn main() {
    let cli = Cli::parse();
    let as_of = cli.as_of.as_deref();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => {
            context(as_of).and_then(|ctx| commands::schedule::run_schedule(args, &ctx))
        }
        Commands::Stack(args) => context(as_of).and_then(|ctx| commands::stack::run_stack(args, &ctx)),
        Commands::Recommend(args) => {
            context(as_of).and_then(|ctx| commands::recommend::run_recommend(args, &ctx))
        }
        Commands::Finder(args) => context(as_of).and_then(|ctx| commands::finder::run_finder(args, &ctx)),
        Commands::Instruments(args) => commands::instruments::run_instruments(args),
        Commands::Version => {
            println!("cstack {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
