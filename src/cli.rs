use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "humanklu",
    version,
    about = "HumanKlu calibration pipeline: score, certify and ledger AI-generated reports"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        help = "Ledger file (overrides config and the output-relative default)"
    )]
    pub ledger: Option<PathBuf>,
    #[arg(long, short, global = true, help = "Debug logging on stderr")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Full pipeline for one report: artifacts plus a ledger entry.
    Run {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, help = "Run folder to create")]
        output: PathBuf,
        #[arg(long, help = "Report id to use instead of a generated HK-<year>-XXXXXX")]
        run_id: Option<String>,
        #[arg(long, default_value_t = false, help = "Replace an existing run folder")]
        force: bool,
    },
    /// Dry run: score and certify without writing anything.
    Score {
        #[arg(long)]
        input: PathBuf,
    },
    /// Run every *.json in a directory and write summary.json.
    Batch {
        #[arg(long)]
        inputs: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Inspect the hash-chained run ledger.
    Ledger {
        #[command(subcommand)]
        command: LedgerCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum LedgerCommands {
    /// Recompute the chain from genesis.
    Verify,
    /// Print every entry in append order.
    List,
}
