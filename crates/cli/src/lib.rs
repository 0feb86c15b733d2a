//! Library side of the `sparkdwh` binary: command planning, execution and
//! summary rendering.

use anyhow::{Context, Result};
use sparkdwh_core::{schema, DwhConfig, DwhError, DwhResult, LoadRunner, RunSummary, Statement, Warehouse};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub mod cli;

pub use cli::{Cli, Command, OutputFormat};

/// Install the global `tracing` subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Load the configuration file named on the command line.
pub fn load_config(cli: &Cli) -> Result<DwhConfig> {
    DwhConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))
}

/// Statements a command would execute, in order, with the IAM role redacted.
pub fn plan(command: Command, config: &DwhConfig) -> DwhResult<Vec<Statement>> {
    let mut statements = Vec::new();
    if matches!(command, Command::CreateTables | Command::Run) {
        statements.extend(schema::plan());
    }
    if matches!(command, Command::Etl | Command::Run) {
        statements.extend(LoadRunner::new(config).plan()?);
    }
    Ok(statements)
}

/// Executes a command end-to-end on a single warehouse session.
///
/// The session is closed whether or not the command succeeds. A command
/// error takes precedence over a close error.
pub async fn run(command: Command, config: &DwhConfig) -> Result<RunSummary> {
    let mut warehouse = Warehouse::connect(&config.cluster)
        .await
        .context("failed to connect to warehouse")?;

    let outcome = execute(command, config, &mut warehouse).await;
    let closed = warehouse.close().await;

    let summary = outcome.with_context(|| format!("{} aborted", command_name(command)))?;
    closed.context("failed to close warehouse session")?;
    info!(
        command = command_name(command),
        statements = summary.statement_count(),
        rows = summary.rows_affected(),
        "command complete"
    );
    Ok(summary)
}

async fn execute(command: Command, config: &DwhConfig, warehouse: &mut Warehouse) -> DwhResult<RunSummary> {
    let mut summary = RunSummary::default();
    let result = async {
        if matches!(command, Command::CreateTables | Command::Run) {
            summary.extend(schema::reset(warehouse).await?);
        }
        if matches!(command, Command::Etl | Command::Run) {
            summary.extend(LoadRunner::new(config).run(warehouse).await?);
        }
        Ok::<(), DwhError>(())
    }
    .await;

    if let Err(err) = &result {
        error!(
            command = command_name(command),
            statement = err.statement_label().unwrap_or("-"),
            completed_statements = summary.statement_count(),
            "command failed: {err}"
        );
    }
    result.map(|()| summary)
}

/// Name of a command as typed on the command line.
pub fn command_name(command: Command) -> &'static str {
    match command {
        Command::CreateTables => "create-tables",
        Command::Etl => "etl",
        Command::Run => "run",
    }
}

/// Render a statement plan for `--dry-run`.
pub fn render_plan(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render a run summary.
pub fn render_summary(summary: &RunSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "status": "success",
                "statements": summary.statement_count(),
                "rows_affected": summary.rows_affected(),
                "elapsed_ms": summary.elapsed_ms(),
                "steps": summary.steps,
            });
            Ok(serde_json::to_string_pretty(&value)?)
        }
        OutputFormat::Text => {
            let mut lines: Vec<String> = summary
                .steps
                .iter()
                .map(|step| {
                    format!(
                        "{:<14} {:>2} statements {:>10} rows {:>8} ms  ({})",
                        step.step.as_str(),
                        step.statements.len(),
                        step.rows_affected,
                        step.elapsed_ms,
                        step.statements.join(", ")
                    )
                })
                .collect();
            lines.push(format!(
                "Executed {} statements, {} rows in {} ms",
                summary.statement_count(),
                summary.rows_affected(),
                summary.elapsed_ms()
            ));
            Ok(lines.join("\n"))
        }
    }
}
