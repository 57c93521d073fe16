use crate::domain::model::{Comparison, OptimizationProblem};
use crate::domain::solver::{SolveOptions, SolveOutcome, SolveStatus, Solver};

use ::highs::{ColProblem, HighsModelStatus, Row, Sense};

/// HiGHS solver implementation
pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        HighsSolver
    }

    /// Convert HiGHS status to our solve status
    fn convert_status(model_status: HighsModelStatus) -> SolveStatus {
        match model_status {
            HighsModelStatus::Optimal => SolveStatus::Optimal,
            HighsModelStatus::Infeasible => SolveStatus::Infeasible,
            HighsModelStatus::Unbounded => SolveStatus::Unbounded,
            // includes UnboundedOrInfeasible and the time/iteration limits
            _ => SolveStatus::SolverError,
        }
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for HighsSolver {
    fn solve(&self, problem: &OptimizationProblem, options: &SolveOptions) -> SolveOutcome {
        let mut highs_problem = ColProblem::new();

        // First, add all constraint rows with their native bounds
        let rows: Vec<Row> = problem
            .constraints()
            .iter()
            .map(|constraint| match constraint.comparison {
                Comparison::LessEq => highs_problem.add_row(..=constraint.rhs),
                Comparison::GreaterEq => highs_problem.add_row(constraint.rhs..),
                Comparison::Equal => highs_problem.add_row(constraint.rhs..=constraint.rhs),
            })
            .collect();

        // For each column, collect its row entries
        let mut col_data: Vec<Vec<(Row, f64)>> = vec![Vec::new(); problem.num_columns()];
        for (constraint, &row) in problem.constraints().iter().zip(&rows) {
            for &(column, coefficient) in &constraint.terms {
                if let Some(entries) = col_data.get_mut(column) {
                    entries.push((row, coefficient));
                }
            }
        }

        for (coefficient, row_factors) in problem.objective().iter().zip(&col_data) {
            highs_problem.add_integer_column(*coefficient, 0.0..=1.0, row_factors);
        }

        let mut model = highs_problem.optimise(Sense::Maximise);
        model.set_option("output_flag", false);
        if let Some(limit) = options.time_limit {
            model.set_option("time_limit", limit.as_secs_f64());
        }
        let solved = model.solve();

        let model_status = solved.status();
        let status = Self::convert_status(model_status);
        if status != SolveStatus::Optimal {
            return SolveOutcome::verdict(status, Some(format!("HiGHS status {:?}", model_status)));
        }

        let solution = solved.get_solution();
        let assignment = solution.columns().to_vec();
        if assignment.len() != problem.num_columns() {
            return SolveOutcome::failed(format!(
                "HiGHS returned {} column values for {} columns",
                assignment.len(),
                problem.num_columns()
            ));
        }
        SolveOutcome::optimal(assignment)
    }

    fn name(&self) -> &str {
        "HiGHS"
    }
}
