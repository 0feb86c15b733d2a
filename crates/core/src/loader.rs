//! Load runner: `COPY` the staging tables, then populate the star schema.

use tracing::info;

use crate::config::DwhConfig;
use crate::copy::{CopyStatement, JsonFormat};
use crate::error::DwhResult;
use crate::queries;
use crate::statement::{Statement, Step};
use crate::summary::StepSummary;
use crate::tables::{STAGING_EVENTS, STAGING_SONGS};
use crate::warehouse::Warehouse;

/// Runs the staging loads and final inserts for one configuration.
///
/// Statements always run in the same order: event log copy, song catalog
/// copy, then `songplays`, `users`, `songs`, `artists`, `time`. The commit
/// discipline comes from `[ETL] COMMIT_MODE`; in single mode a full
/// [`LoadRunner::run`] shares one transaction across both steps.
#[derive(Debug, Clone, Copy)]
pub struct LoadRunner<'a> {
    config: &'a DwhConfig,
}

impl<'a> LoadRunner<'a> {
    /// Create a runner over the given configuration.
    pub fn new(config: &'a DwhConfig) -> Self {
        Self { config }
    }

    /// The two `COPY` statements, events first.
    pub fn copy_statements(&self) -> [CopyStatement; 2] {
        let role = &self.config.iam_role.arn;
        let s3 = &self.config.s3;
        [
            CopyStatement::new(
                &STAGING_EVENTS,
                &s3.log_data,
                role,
                JsonFormat::JsonPaths(s3.log_jsonpath.clone()),
            ),
            CopyStatement::new(&STAGING_SONGS, &s3.song_data, role, JsonFormat::Auto),
        ]
    }

    /// Rendered staging load statements.
    pub fn staging_statements(&self) -> DwhResult<Vec<Statement>> {
        self.copy_statements()
            .iter()
            .map(CopyStatement::to_statement)
            .collect()
    }

    /// Staging loads then inserts, with the IAM role redacted. Nothing is executed.
    pub fn plan(&self) -> DwhResult<Vec<Statement>> {
        let mut statements = Vec::with_capacity(7);
        for copy in self.copy_statements() {
            statements.push(Statement::new(
                Step::LoadStaging,
                copy.table(),
                copy.render_redacted()?,
            ));
        }
        statements.extend(queries::insert_statements());
        Ok(statements)
    }

    /// Copy both source datasets into the staging tables.
    pub async fn load_staging(&self, warehouse: &mut Warehouse) -> DwhResult<StepSummary> {
        let statements = self.staging_statements()?;
        warehouse
            .run_step(Step::LoadStaging, &statements, self.config.etl.commit_mode)
            .await
    }

    /// Populate `songplays`, `users`, `songs`, `artists` and `time` from staging.
    pub async fn insert_final(&self, warehouse: &mut Warehouse) -> DwhResult<StepSummary> {
        warehouse
            .run_step(
                Step::InsertFinal,
                &queries::insert_statements(),
                self.config.etl.commit_mode,
            )
            .await
    }

    /// Full load: staging then final tables.
    pub async fn run(&self, warehouse: &mut Warehouse) -> DwhResult<Vec<StepSummary>> {
        info!(
            log_data = %self.config.s3.log_data,
            song_data = %self.config.s3.song_data,
            commit_mode = ?self.config.etl.commit_mode,
            "starting load"
        );
        let staging = self.staging_statements()?;
        let inserts = queries::insert_statements();
        warehouse
            .run_steps(
                &[
                    (Step::LoadStaging, staging.as_slice()),
                    (Step::InsertFinal, inserts.as_slice()),
                ],
                self.config.etl.commit_mode,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::SAMPLE;

    fn config() -> DwhConfig {
        DwhConfig::parse(SAMPLE).unwrap()
    }

    #[test]
    fn staging_loads_events_then_songs() {
        let config = config();
        let statements = LoadRunner::new(&config).staging_statements().unwrap();
        let labels: Vec<_> = statements.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["staging_events", "staging_songs"]);
        assert!(statements[0]
            .sql
            .ends_with("JSON 's3://udacity-dend/log_json_path.json'"));
        assert!(statements[0]
            .sql
            .contains("IAM_ROLE 'arn:aws:iam::123456789012:role/dwhRole'"));
        assert!(statements[1].sql.ends_with("JSON 'auto'"));
    }

    #[test]
    fn plan_is_two_copies_then_five_inserts() {
        let config = config();
        let plan = LoadRunner::new(&config).plan().unwrap();
        let steps: Vec<_> = plan.iter().map(|s| (s.step, s.label.as_str())).collect();
        assert_eq!(
            steps,
            vec![
                (Step::LoadStaging, "staging_events"),
                (Step::LoadStaging, "staging_songs"),
                (Step::InsertFinal, "songplays"),
                (Step::InsertFinal, "users"),
                (Step::InsertFinal, "songs"),
                (Step::InsertFinal, "artists"),
                (Step::InsertFinal, "time"),
            ]
        );
        assert!(plan.iter().all(|s| !s.sql.contains("123456789012")));
    }

    #[test]
    fn bad_source_value_fails_before_execution() {
        let mut config = config();
        config.s3.song_data = "s3://bucket/songs\\x".to_string();
        assert!(LoadRunner::new(&config).staging_statements().is_err());
    }
}
