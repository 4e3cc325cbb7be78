mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::optimize::OptimizeArgs;
use commands::validate::ValidateArgs;

/// Target-allocation transfers for a diversified portfolio
#[derive(Parser)]
#[command(
    name = "diversify",
    version,
    about = "Compute the transfers that bring a portfolio closest to its target allocation",
    long_about = "Given current asset values, target rates per asset and per asset class, \
                  and optional linear constraints, compute how much to add to or withdraw \
                  from each asset. All amounts use decimal arithmetic."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log solver progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize transfers for a given total amount
    Optimize(OptimizeArgs),
    /// Run every pre-solve check on a snapshot and list warnings
    Validate(ValidateArgs),
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

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` applies
/// unless `--verbose` asks for debug output.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Optimize(args) => commands::optimize::run_optimize(args),
        Commands::Validate(args) => commands::validate::run_validate(args),
        Commands::Version => {
            println!("diversify {}", env!("CARGO_PKG_VERSION"));
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
