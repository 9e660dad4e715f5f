//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vantage_pipeline::{Stage, DEFAULT_CONFIG_FILE};

/// Vantage - collect, enrich and summarize competitor intelligence.
#[derive(Debug, Parser)]
#[command(name = "vantage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "VANTAGE_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Log filter (e.g. `debug`, `vantage_enricher=trace`); overrides RUST_LOG
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "table")]
    pub format: CliFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run every stage: ingest, cleanup, enrich, synthesize
    Run,

    /// Append new collector records to the raw tables
    Ingest,

    /// Enrich records not yet analyzed
    Enrich,

    /// Rebuild the insight document from the enriched tables
    Synthesize,

    /// Remove rows past their retention horizon
    Cleanup(CleanupArgs),

    /// Print the current insight document
    Show,

    /// Write a starter configuration file
    InitConfig(InitConfigArgs),
}

/// Arguments for the cleanup command.
#[derive(Debug, Parser)]
pub struct CleanupArgs {
    /// Report what would be removed without changing any table
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the init-config command.
#[derive(Debug, Parser)]
pub struct InitConfigArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl Command {
    /// Pipeline stages this command runs, if it is a pipeline command
    pub fn stages(&self) -> Option<&'static [Stage]> {
        match self {
            Command::Run => Some(&Stage::ALL),
            Command::Ingest => Some(&[Stage::Ingest]),
            Command::Enrich => Some(&[Stage::Enrich]),
            Command::Synthesize => Some(&[Stage::Synthesize]),
            Command::Cleanup(_) | Command::Show | Command::InitConfig(_) => None,
        }
    }
}

impl From<CliFormat> for crate::output::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::output::OutputFormat::Table,
            CliFormat::Json => crate::output::OutputFormat::Json,
        }
    }
}
