//! Single warehouse session used by every step of a run.

use std::time::Instant;

use sqlx::postgres::{PgConnection, Postgres};
use sqlx::{Connection, Executor};
use tracing::{debug, info};

use crate::config::{ClusterConfig, CommitMode};
use crate::error::{DwhError, DwhResult};
use crate::statement::{Statement, Step};
use crate::summary::StepSummary;

/// One open connection to the warehouse.
///
/// There is no pool: statements run one after another on this session.
/// Callers must finish with [`Warehouse::close`], including on error paths,
/// so the cluster gets its session slot back.
pub struct Warehouse {
    conn: PgConnection,
    endpoint: String,
    opened_at: Instant,
}

impl Warehouse {
    /// Open a session using the `[CLUSTER]` settings.
    pub async fn connect(cluster: &ClusterConfig) -> DwhResult<Self> {
        let endpoint = cluster.endpoint();
        info!(%endpoint, "connecting to warehouse");
        let conn = PgConnection::connect_with(&cluster.connect_options())
            .await
            .map_err(|source| DwhError::Connection {
                endpoint: endpoint.clone(),
                source,
            })?;
        Ok(Self {
            conn,
            endpoint,
            opened_at: Instant::now(),
        })
    }

    /// Raw connection, for ad-hoc queries such as test assertions.
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }

    /// Run one step under the given commit discipline.
    pub async fn run_step(
        &mut self,
        step: Step,
        statements: &[Statement],
        mode: CommitMode,
    ) -> DwhResult<StepSummary> {
        let mut summaries = self.run_steps(&[(step, statements)], mode).await?;
        Ok(summaries.remove(0))
    }

    /// Run several steps in order.
    ///
    /// Stops at the first failure. With [`CommitMode::PerStatement`] the
    /// statements that already ran stay committed; with [`CommitMode::Single`]
    /// all steps share one transaction, which is rolled back when dropped on
    /// error.
    pub async fn run_steps(
        &mut self,
        steps: &[(Step, &[Statement])],
        mode: CommitMode,
    ) -> DwhResult<Vec<StepSummary>> {
        let mut summaries = Vec::with_capacity(steps.len());
        match mode {
            CommitMode::PerStatement => {
                for (step, statements) in steps {
                    summaries.push(run_step_on(&mut self.conn, *step, statements).await?);
                }
            }
            CommitMode::Single => {
                let mut tx = self.conn.begin().await.map_err(DwhError::Transaction)?;
                for (step, statements) in steps {
                    summaries.push(run_step_on(&mut *tx, *step, statements).await?);
                }
                tx.commit().await.map_err(DwhError::Transaction)?;
            }
        }
        Ok(summaries)
    }

    /// Close the session gracefully.
    pub async fn close(self) -> DwhResult<()> {
        let elapsed = self.opened_at.elapsed();
        self.conn.close().await.map_err(|source| DwhError::Close {
            endpoint: self.endpoint.clone(),
            source,
        })?;
        sparkdwh_observability::record_session_closed(&self.endpoint, elapsed);
        Ok(())
    }
}

async fn run_step_on(
    conn: &mut PgConnection,
    step: Step,
    statements: &[Statement],
) -> DwhResult<StepSummary> {
    info!(%step, statements = statements.len(), "starting step");
    let started = Instant::now();
    let mut rows = 0;
    for statement in statements {
        rows += run_statement(&mut *conn, statement).await?;
    }
    let elapsed = started.elapsed();
    sparkdwh_observability::record_step_complete(step.as_str(), statements.len(), elapsed);
    Ok(StepSummary::new(
        step,
        statements.iter().map(|s| s.label.clone()).collect(),
        rows,
        elapsed,
    ))
}

async fn run_statement<'e, E>(executor: E, statement: &'e Statement) -> DwhResult<u64>
where
    E: Executor<'e, Database = Postgres>,
{
    let step = statement.step.as_str();
    debug!(step, statement = %statement.label, sql = %statement.sql, "executing");

    let started = Instant::now();
    let result = if statement.is_parameterized() {
        let mut query = sqlx::query(&statement.sql);
        for value in &statement.params {
            query = query.bind(value.as_str());
        }
        query.execute(executor).await
    } else {
        sqlx::raw_sql(&statement.sql).execute(executor).await
    };

    match result {
        Ok(done) => {
            let rows = done.rows_affected();
            sparkdwh_observability::record_statement_latency(
                step,
                &statement.label,
                started.elapsed(),
                rows,
            );
            Ok(rows)
        }
        Err(source) => {
            sparkdwh_observability::record_statement_failure(
                step,
                &statement.label,
                &source.to_string(),
            );
            Err(DwhError::Statement {
                label: statement.label.clone(),
                source,
            })
        }
    }
}
