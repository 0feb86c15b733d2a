//! Schema manager: drop and recreate the seven tables.
//!
//! Every statement commits on its own. A failure stops the sequence and
//! leaves earlier drops/creates in place; rerunning the whole reset is safe
//! because both halves use existence checks.

use crate::config::CommitMode;
use crate::error::DwhResult;
use crate::statement::{Statement, Step};
use crate::summary::StepSummary;
use crate::tables::{CREATE_ORDER, DROP_ORDER};
use crate::warehouse::Warehouse;

/// `DROP TABLE IF EXISTS` for every table, in drop order.
pub fn drop_statements() -> Vec<Statement> {
    DROP_ORDER
        .iter()
        .map(|table| Statement::new(Step::DropTables, table.name, table.drop_sql()))
        .collect()
}

/// `CREATE TABLE IF NOT EXISTS` for every table, fact table last.
pub fn create_statements() -> Vec<Statement> {
    CREATE_ORDER
        .iter()
        .map(|table| Statement::new(Step::CreateTables, table.name, table.create_sql()))
        .collect()
}

/// Drops followed by creates.
pub fn plan() -> Vec<Statement> {
    let mut statements = drop_statements();
    statements.extend(create_statements());
    statements
}

/// Drop every table that exists.
pub async fn drop_tables(warehouse: &mut Warehouse) -> DwhResult<StepSummary> {
    warehouse
        .run_step(Step::DropTables, &drop_statements(), CommitMode::PerStatement)
        .await
}

/// Create every table that does not exist.
pub async fn create_tables(warehouse: &mut Warehouse) -> DwhResult<StepSummary> {
    warehouse
        .run_step(Step::CreateTables, &create_statements(), CommitMode::PerStatement)
        .await
}

/// Drop then create all tables.
pub async fn reset(warehouse: &mut Warehouse) -> DwhResult<Vec<StepSummary>> {
    let dropped = drop_tables(warehouse).await?;
    let created = create_tables(warehouse).await?;
    Ok(vec![dropped, created])
}
