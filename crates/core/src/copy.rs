//! Construction of Redshift `COPY` statements.
//!
//! `COPY` takes its source URI, IAM role and JSONPaths location as string
//! literals and cannot bind them as parameters, so this module is the only
//! place configuration values are spliced into SQL text. Every value passes
//! through [`quote_literal`].

use crate::error::{DwhError, DwhResult};
use crate::statement::{Statement, Step};
use crate::tables::TableDef;

/// How `COPY` maps JSON fields onto table columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonFormat {
    /// Match JSON keys to column names
    Auto,
    /// Use an explicit JSONPaths file
    JsonPaths(String),
}

/// A `COPY <table> FROM <source> IAM_ROLE <role> JSON <format>` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyStatement {
    table: &'static str,
    source: String,
    iam_role: String,
    format: JsonFormat,
}

impl CopyStatement {
    /// Copy JSON records from `source` into `table`.
    pub fn new(
        table: &TableDef,
        source: impl Into<String>,
        iam_role: impl Into<String>,
        format: JsonFormat,
    ) -> Self {
        Self {
            table: table.name,
            source: source.into(),
            iam_role: iam_role.into(),
            format,
        }
    }

    /// Target table name.
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Render the statement with every literal quoted.
    pub fn render(&self) -> DwhResult<String> {
        self.render_with_role(&quote_literal(&self.iam_role)?)
    }

    /// Render the statement with the IAM role masked, for plans and logs.
    pub fn render_redacted(&self) -> DwhResult<String> {
        self.render_with_role("'<redacted>'")
    }

    /// Build the runnable statement for the staging load step.
    pub fn to_statement(&self) -> DwhResult<Statement> {
        Ok(Statement::new(Step::LoadStaging, self.table, self.render()?))
    }

    fn render_with_role(&self, role: &str) -> DwhResult<String> {
        let format = match &self.format {
            JsonFormat::Auto => "'auto'".to_string(),
            JsonFormat::JsonPaths(path) => quote_literal(path)?,
        };
        Ok(format!(
            "COPY {}\nFROM {}\nIAM_ROLE {}\nJSON {}",
            self.table,
            quote_literal(&self.source)?,
            role,
            format
        ))
    }
}

/// Quote a value as a SQL string literal.
///
/// Single quotes are doubled. Backslashes and control characters are
/// rejected outright since Redshift treats backslash as an escape inside
/// literals and no S3 URI or role ARN needs either.
pub fn quote_literal(value: &str) -> DwhResult<String> {
    if value.is_empty() {
        return Err(DwhError::config("empty value cannot be used in COPY"));
    }
    if let Some(bad) = value.chars().find(|c| *c == '\\' || c.is_control()) {
        return Err(DwhError::config(format!(
            "value {value:?} contains forbidden character {bad:?}"
        )));
    }
    Ok(format!("'{}'", value.replace('\'', "''")))
}
