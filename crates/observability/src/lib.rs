use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{info, warn};

static STATEMENTS_EXECUTED_TOTAL: AtomicU64 = AtomicU64::new(0);
static STATEMENT_FAILURES_TOTAL: AtomicU64 = AtomicU64::new(0);
static ROWS_AFFECTED_TOTAL: AtomicU64 = AtomicU64::new(0);

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Records a completed warehouse statement and bumps the executed counters.
pub fn record_statement_latency(step: &str, label: &str, duration: Duration, rows: u64) {
    let total = STATEMENTS_EXECUTED_TOTAL.fetch_add(1, Ordering::Relaxed) + 1;
    ROWS_AFFECTED_TOTAL.fetch_add(rows, Ordering::Relaxed);
    info!(
        metric = "statement_latency_ms",
        step,
        statement = label,
        latency_ms = duration_ms(duration),
        rows,
        statements_executed_total = total
    );
}

/// Records a failed warehouse statement.
pub fn record_statement_failure(step: &str, label: &str, error: &str) {
    let total = STATEMENT_FAILURES_TOTAL.fetch_add(1, Ordering::Relaxed) + 1;
    warn!(
        metric = "statement_failure",
        step,
        statement = label,
        error,
        statement_failures_total = total
    );
}

/// Records the end of a step (schema reset, staging load, final inserts).
pub fn record_step_complete(step: &str, statements: usize, duration: Duration) {
    info!(
        metric = "step_latency_ms",
        step,
        statements,
        latency_ms = duration_ms(duration)
    );
}

/// Records an explicitly closed warehouse session.
pub fn record_session_closed(endpoint: &str, duration: Duration) {
    info!(
        metric = "session_duration_ms",
        endpoint,
        latency_ms = duration_ms(duration)
    );
}

/// Statements executed successfully since process start.
pub fn statements_executed_total() -> u64 {
    STATEMENTS_EXECUTED_TOTAL.load(Ordering::Relaxed)
}

/// Statements that returned an error since process start.
pub fn statement_failures_total() -> u64 {
    STATEMENT_FAILURES_TOTAL.load(Ordering::Relaxed)
}

/// Rows reported by the warehouse across all executed statements.
pub fn rows_affected_total() -> u64 {
    ROWS_AFFECTED_TOTAL.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let executed = statements_executed_total();
        let failed = statement_failures_total();
        let rows = rows_affected_total();

        record_statement_latency("insert_final", "songplays", Duration::from_millis(12), 3);
        record_statement_latency("insert_final", "users", Duration::from_millis(4), 2);
        record_statement_failure("load_staging", "staging_events", "permission denied");

        assert!(statements_executed_total() >= executed + 2);
        assert!(statement_failures_total() > failed);
        assert!(rows_affected_total() >= rows + 5);
    }

    #[test]
    fn duration_converts_to_millis() {
        assert_eq!(duration_ms(Duration::from_millis(1500)), 1500.0);
    }
}
