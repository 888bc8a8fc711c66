use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;
mod commands;
mod domain;
mod error;
mod services;

pub use cli::*;
pub use commands::*;
pub use domain::models::*;
pub use services::batch::{run_batch, ERROR_LEVEL};
pub use services::ledger::{read_entries, verify_chain};
pub use services::output::{opt_num, print_one, print_out};
pub use services::pipeline::{run_file, score_report, RunOptions};
pub use services::storage::{
    load_config, resolve_batch_ledger_path, resolve_ledger_path, resolve_standalone_ledger_path,
};
pub use services::validation::load_report;

fn init_tracing(verbose: bool) {
    // stdout carries --json output; logs stay on stderr
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config()?;

    if handle_ledger_commands(&cli, &config)? {
        return Ok(());
    }
    handle_runtime_commands(&cli, &config)
}
