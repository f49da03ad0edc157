//! sportsdb command-line client.
//!
//! ```text
//! sportsdb [--config FILE] [--data FILE] [-v] <op> <kind> [args...]
//! sportsdb [--config FILE] [--data FILE] [-v] repl
//! ```
//!
//! Results are printed to stdout as JSON. Logs go to stderr.

mod repl;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sportsdb_engine::{Database, SportsDbConfig};
use sportsdb_executor::{Command, Executor, Output};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Field-per-key store for sports, events and selections
#[derive(Parser)]
#[command(name = "sportsdb", author, version, about, long_about = None)]
#[command(override_usage = "sportsdb [OPTIONS] <OP> <KIND> [ARGS]...\n       sportsdb [OPTIONS] repl")]
struct Cli {
    /// TOML configuration file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Snapshot file holding the data; overrides `snapshot_path` from the config
    #[arg(long, value_name = "FILE", global = true)]
    data: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Start an interactive session
    Repl,

    /// One operation: create, update, deactivate, activate, get or filter
    #[command(external_subcommand)]
    Run(Vec<String>),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let executor = open_executor(cli.config, cli.data)?;

    match cli.mode {
        Mode::Repl => {
            repl::run(&executor)?;
            Ok(ExitCode::SUCCESS)
        }
        Mode::Run(words) => {
            let Some((op, rest)) = words.split_first() else {
                anyhow::bail!("missing operation");
            };
            let Some((kind, args)) = rest.split_first() else {
                anyhow::bail!("missing entity kind after '{}'", op);
            };
            Ok(print_outcome(execute(&executor, op, kind, args)))
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sportsdb=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sportsdb=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

fn open_executor(config: Option<PathBuf>, data: Option<PathBuf>) -> anyhow::Result<Executor> {
    let mut settings = match config {
        Some(path) => SportsDbConfig::from_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SportsDbConfig::default(),
    };
    if let Some(path) = data {
        settings = settings.with_snapshot_path(path);
    }
    debug!(config = ?settings, "Opening database");

    let db: Arc<Database> = Database::open(settings).context("opening database")?;
    Ok(Executor::new(db))
}

/// Parse and run one operation, flushing the snapshot after writes.
pub(crate) fn execute(
    executor: &Executor,
    op: &str,
    kind: &str,
    args: &[String],
) -> sportsdb_executor::Result<Output> {
    let command = Command::parse(op, kind, args)?;
    let mutating = command.is_mutating();
    let output = executor.execute(command)?;
    if mutating {
        executor.flush()?;
    }
    Ok(output)
}

/// Print a result as JSON: output to stdout, errors to stderr.
pub(crate) fn print_outcome(outcome: sportsdb_executor::Result<Output>) -> ExitCode {
    let rendered = match outcome {
        Ok(output) => output.to_json_string().map(|json| (json, true)),
        Err(err) => serde_json::to_string_pretty(&err)
            .map(|json| (json, false))
            .map_err(|e| sportsdb_executor::Error::Serialization {
                reason: e.to_string(),
            }),
    };
    match rendered {
        Ok((json, true)) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Ok((json, false)) => {
            eprintln!("{}", json);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
