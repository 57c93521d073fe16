use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::domain::model::OptimizationProblem;

/// Final verdict of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// The solver failed, timed out, or could not decide.
    SolverError,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::SolverError => "solver error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveOptions {
    /// Wall-clock budget for one solve. `None` waits for a verdict.
    pub time_limit: Option<Duration>,
}

/// What a backend hands back: a status and, only when optimal, one value per column.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub assignment: Option<Vec<f64>>,
    pub detail: Option<String>,
}

impl SolveOutcome {
    pub fn optimal(assignment: Vec<f64>) -> Self {
        SolveOutcome {
            status: SolveStatus::Optimal,
            assignment: Some(assignment),
            detail: None,
        }
    }

    pub fn verdict(status: SolveStatus, detail: Option<String>) -> Self {
        SolveOutcome {
            status,
            assignment: None,
            detail,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self::verdict(SolveStatus::SolverError, Some(detail.into()))
    }
}

/// Common interface for binary integer programming backends.
///
/// A backend reports the solver's verdict as-is: it never retries, relaxes
/// constraints, or reports dual values.
pub trait Solver: Send + Sync {
    /// Maximize the problem's objective over binary columns.
    fn solve(&self, problem: &OptimizationProblem, options: &SolveOptions) -> SolveOutcome;

    /// Get the solver name for logging/debugging
    fn name(&self) -> &str;
}
