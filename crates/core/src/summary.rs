//! Per-step and per-run outcome reporting.

use std::time::Duration;

use serde::Serialize;

use crate::statement::Step;

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSummary {
    /// Which step ran
    pub step: Step,
    /// Statements executed, in order
    pub statements: Vec<String>,
    /// Rows reported by the warehouse across the step
    pub rows_affected: u64,
    /// Wall time in milliseconds
    pub elapsed_ms: u64,
}

impl StepSummary {
    pub(crate) fn new(step: Step, statements: Vec<String>, rows_affected: u64, elapsed: Duration) -> Self {
        Self {
            step,
            statements,
            rows_affected,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Outcome of a full command: one or more steps on the same session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Steps in execution order
    pub steps: Vec<StepSummary>,
}

impl RunSummary {
    /// Append the summaries of a finished component.
    pub fn extend(&mut self, steps: impl IntoIterator<Item = StepSummary>) {
        self.steps.extend(steps);
    }

    /// Total statements executed.
    pub fn statement_count(&self) -> usize {
        self.steps.iter().map(|s| s.statements.len()).sum()
    }

    /// Total rows reported.
    pub fn rows_affected(&self) -> u64 {
        self.steps.iter().map(|s| s.rows_affected).sum()
    }

    /// Total wall time in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.elapsed_ms).sum()
    }
}
