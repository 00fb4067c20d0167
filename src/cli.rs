use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pipecheck",
    version,
    about = "Sequencing pipeline run QC evaluation CLI"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a health-check log and emit a per-sample verdict
    Check(CheckCommand),
    /// Run filesystem probes over a pipeline run directory
    Probe(ProbeCommand),
}

#[derive(Args)]
pub struct CheckCommand {
    /// Path to the health-check log
    pub log: PathBuf,

    /// Downgrade missing metrics to warnings where evaluation can proceed
    #[arg(long)]
    pub lenient: bool,

    #[arg(short, long, value_enum, default_value = "text")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct ProbeCommand {
    /// Pipeline run directory to probe
    pub run_dir: PathBuf,
}

#[derive(Clone, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}
