//! A labelled SQL statement and the step it belongs to.

use std::fmt;

use serde::Serialize;

/// Phase of a run. Each statement belongs to exactly one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// `DROP TABLE IF EXISTS` for every table
    DropTables,
    /// `CREATE TABLE IF NOT EXISTS` for every table
    CreateTables,
    /// `COPY` from S3 into the staging tables
    LoadStaging,
    /// `INSERT ... SELECT` from staging into the star schema
    InsertFinal,
}

impl Step {
    /// Stable name used in logs and summaries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DropTables => "drop_tables",
            Self::CreateTables => "create_tables",
            Self::LoadStaging => "load_staging",
            Self::InsertFinal => "insert_final",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One SQL statement with optional positional text parameters (`$1`, `$2`, ...).
///
/// Statements without parameters go over the simple query protocol, which is
/// what `COPY` and DDL expect; parameterised statements are prepared and bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Step this statement runs in
    pub step: Step,
    /// Short label, normally the target table
    pub label: String,
    /// SQL text
    pub sql: String,
    /// Values bound to `$1..$n`
    pub params: Vec<String>,
}

impl Statement {
    /// Statement with no bound parameters.
    pub fn new(step: Step, label: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            step,
            label: label.into(),
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append a bound parameter.
    pub fn bind(mut self, value: impl Into<String>) -> Self {
        self.params.push(value.into());
        self
    }

    /// True when the statement needs the extended (prepared) protocol.
    pub fn is_parameterized(&self) -> bool {
        !self.params.is_empty()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-- [{}] {}", self.step, self.label)?;
        for (idx, value) in self.params.iter().enumerate() {
            writeln!(f, "-- ${} = '{}'", idx + 1, value)?;
        }
        write!(f, "{};", self.sql.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_marks_statement_parameterized() {
        let plain = Statement::new(Step::DropTables, "users", "DROP TABLE IF EXISTS users");
        assert!(!plain.is_parameterized());

        let bound = Statement::new(Step::InsertFinal, "users", "SELECT $1").bind("NextSong");
        assert!(bound.is_parameterized());
        assert_eq!(bound.params, vec!["NextSong".to_string()]);
    }

    #[test]
    fn display_lists_step_label_and_params() {
        let stmt = Statement::new(Step::InsertFinal, "users", "SELECT * FROM x WHERE page = $1\n")
            .bind("NextSong");
        let rendered = stmt.to_string();
        assert_eq!(
            rendered,
            "-- [insert_final] users\n-- $1 = 'NextSong'\nSELECT * FROM x WHERE page = $1;"
        );
    }
}
