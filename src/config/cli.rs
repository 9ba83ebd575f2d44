use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "profile-harvester")]
#[command(about = "Harvests business profile links and captures stale profiles")]
pub struct CliArgs {
    /// Path to TOML configuration file (defaults are used when absent)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON log lines
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run harvest + capture cycles until interrupted
    Run,
    /// Run a single harvest + capture cycle
    Once,
    /// Harvest links for the given terms once and print them
    Search {
        #[arg(required = true)]
        terms: Vec<String>,
    },
}

impl CliArgs {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}
