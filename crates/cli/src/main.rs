use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

mod config;
mod run;

use config::RunConfig;
use run::RunArgs;

#[derive(Parser, Debug)]
#[command(name = "saldo", version, about = "Reconcile bank transactions against parsed receipts")]
struct Cli {
    /// Source ledger CSV (the transaction table)
    #[arg(long)]
    ledger: PathBuf,

    /// Parsed receipt CSV (output of the receipt intake pipeline)
    #[arg(long)]
    receipts: PathBuf,

    /// Output CSV to write reconciled rows to
    #[arg(long)]
    output: PathBuf,

    /// Optional TOML run configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Production appends and marks matched rows processed;
    /// development clears state and rewrites everything
    #[arg(long, value_enum, default_value_t = Mode::Production)]
    mode: Mode,

    /// Only process transactions from this month (1-12)
    #[arg(long)]
    month: Option<u32>,

    /// Only process transactions from this year
    #[arg(long)]
    year: Option<i32>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Production,
    Development,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = RunConfig::load(cli.config.as_deref())?;

    run::run(RunArgs {
        ledger: cli.ledger,
        receipts: cli.receipts,
        output: cli.output,
        mode: cli.mode,
        month: cli.month,
        year: cli.year,
        config,
    })
}
