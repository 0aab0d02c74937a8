//! Multisig CLI - Command-line interface for quorum-governed wallets
//!
//! This CLI gives operators a terminal interface to:
//! - Deploy wallet instances from a TOML deployment file
//! - Replay scripted operations against a fresh instance and inspect
//!   the outcome of each step and the notices it emitted

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;

pub use error::{CliError, CliResult};
pub use output::OutputFormat;

/// Multisig CLI application
#[derive(Parser)]
#[command(name = "multisig")]
#[command(about = "Multisig - quorum-governed wallet engine CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table")]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, env = "MULTISIG_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Create one instance per deployment in a config file
    Deploy {
        /// Deployment or factory file (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Deploy one instance and replay an operation script against it
    Run {
        /// Deployment file (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Operation script (TOML, `[[ops]]` entries)
        #[arg(short, long)]
        script: PathBuf,
    },
}

/// Run using the current process arguments.
pub fn run() -> CliResult<()> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    init_tracing(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Deploy { config } => commands::deploy::execute(&config, cli.output),
        Commands::Run { config, script } => commands::run::execute(&config, &script, cli.output),
    }
}

/// Logs go to stderr so structured output on stdout stays parseable
fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    // A subscriber may already be installed when embedded; keep it
    let _ = if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
}
