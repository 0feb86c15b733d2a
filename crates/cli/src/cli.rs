//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use sparkdwh_core::config::DEFAULT_CONFIG_FILE;

/// Songplay warehouse schema and load tools.
#[derive(Parser, Debug)]
#[command(name = "sparkdwh", author, version, about = "Songplay warehouse schema and load tools", long_about = None)]
pub struct Cli {
    /// Path to the INI configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Print the statements that would run without connecting
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Output format for the run summary
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable debug logging (statement text)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `run` when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The command to execute; a bare invocation runs the full pipeline.
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Drop and recreate all staging, fact and dimension tables
    CreateTables,
    /// Copy staging data from S3 and populate the star schema
    Etl,
    /// create-tables followed by etl on one connection
    Run,
}

/// Summary rendering.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human readable lines
    Text,
    /// Pretty-printed JSON
    Json,
}
