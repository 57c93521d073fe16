use std::collections::HashMap;
use thiserror::Error;

use crate::domain::model::{Comparison, OptimizationProblem};
use crate::domain::solver::SolveStatus;

use glpk_rust::{
    Bound, IntegerSparseMatrix as GlpkMatrix, SparseLEIntegerPolyhedron as GlpkPoly,
    Status as GlpkStatus, Variable as GlpkVar,
};

const BINARY: Bound = (0, 1);

/// `glp_intopt` "no primal feasible solution", reported by glpk-rust as
/// `MIPFailed` with the code in the message.
const GLP_ENOPFS: i32 = 10;

#[derive(Error, Debug, PartialEq)]
pub enum ConversionError {
    #[error("coefficient {value} in `{label}` is not an integer within i32 range")]
    NonIntegral { label: String, value: f64 },
}

/// `A x <= b` over binary columns with integer data, in coordinate format.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLeSystem {
    pub rows: Vec<i32>,
    pub cols: Vec<i32>,
    pub vals: Vec<i32>,
    pub b: Vec<i32>,
    pub ncols: usize,
}

impl IntegerLeSystem {
    pub fn nrows(&self) -> usize {
        self.b.len()
    }

    fn push_row(&mut self, terms: &[(i32, i32)], rhs: i32) {
        let row = self.b.len() as i32;
        for &(col, val) in terms {
            self.rows.push(row);
            self.cols.push(col);
            self.vals.push(val);
        }
        self.b.push(rhs);
    }
}

/// Lower a problem to `<=` rows: `>=` rows are negated, `==` rows become a pair.
pub fn to_integer_le(problem: &OptimizationProblem) -> Result<IntegerLeSystem, ConversionError> {
    let mut system = IntegerLeSystem {
        rows: Vec::new(),
        cols: Vec::new(),
        vals: Vec::new(),
        b: Vec::new(),
        ncols: problem.num_columns(),
    };

    for constraint in problem.constraints() {
        let label = constraint.label.to_string();
        let integral = |value: f64| to_i32(value).ok_or_else(|| ConversionError::NonIntegral {
            label: label.clone(),
            value,
        });

        let mut terms = Vec::with_capacity(constraint.terms.len());
        for &(column, coefficient) in &constraint.terms {
            terms.push((column as i32, integral(coefficient)?));
        }
        let rhs = integral(constraint.rhs)?;
        let negated: Vec<(i32, i32)> = terms.iter().map(|&(c, v)| (c, -v)).collect();

        match constraint.comparison {
            Comparison::LessEq => system.push_row(&terms, rhs),
            Comparison::GreaterEq => system.push_row(&negated, -rhs),
            Comparison::Equal => {
                system.push_row(&terms, rhs);
                system.push_row(&negated, -rhs);
            }
        }
    }
    Ok(system)
}

fn to_i32(value: f64) -> Option<i32> {
    let rounded = value.round();
    let in_range = rounded >= f64::from(i32::MIN + 1) && rounded <= f64::from(i32::MAX);
    ((value - rounded).abs() < 1e-9 && in_range).then_some(rounded as i32)
}

/// Solver-side column names, one per column, in column order.
pub fn column_ids(ncols: usize) -> Vec<String> {
    (0..ncols).map(|column| format!("x{}", column)).collect()
}

/// Convert an integer LE system to a GLPK LE polyhedron borrowing `ids`.
pub fn to_glpk_polyhedron<'a>(system: &IntegerLeSystem, ids: &'a [String]) -> GlpkPoly<'a> {
    let a = GlpkMatrix {
        rows: system.rows.clone(),
        cols: system.cols.clone(),
        vals: system.vals.clone(),
    };
    let b: Vec<Bound> = system.b.iter().map(|&v| (0, v)).collect();

    let variables: Vec<GlpkVar<'a>> = ids
        .iter()
        .map(|id| GlpkVar {
            id: id.as_str(),
            bound: BINARY,
        })
        .collect();

    GlpkPoly {
        a,
        b,
        variables,
        double_bound: false,
    }
}

/// Objective coefficients keyed by the same borrowed names as the polyhedron.
pub fn to_borrowed_objective<'a>(ids: &'a [String], objective: &[f64]) -> HashMap<&'a str, f64> {
    ids.iter()
        .zip(objective)
        .map(|(id, &coefficient)| (id.as_str(), coefficient))
        .collect()
}

impl From<GlpkStatus> for SolveStatus {
    fn from(s: GlpkStatus) -> Self {
        match s {
            GlpkStatus::Optimal => SolveStatus::Optimal,
            GlpkStatus::Infeasible | GlpkStatus::NoFeasible => SolveStatus::Infeasible,
            GlpkStatus::Unbounded => SolveStatus::Unbounded,
            // Feasible means "not proven optimal"; never pass that off as optimal.
            GlpkStatus::Feasible
            | GlpkStatus::Undefined
            | GlpkStatus::SimplexFailed
            | GlpkStatus::MIPFailed
            | GlpkStatus::EmptySpace => SolveStatus::SolverError,
        }
    }
}

/// Status of a GLPK solution, reading the return code attached to `MIPFailed`.
///
/// With presolve on, GLPK proves an infeasible LP relaxation before branching
/// and returns `GLP_ENOPFS`; that is a verdict, not a failure. Every other
/// code, `GLP_ENODFS` (11) included, stays a solver error.
pub fn glpk_status(status: GlpkStatus, error: Option<&str>) -> SolveStatus {
    match status {
        GlpkStatus::MIPFailed => match error.and_then(failure_code) {
            Some(GLP_ENOPFS) => SolveStatus::Infeasible,
            _ => SolveStatus::SolverError,
        },
        other => SolveStatus::from(other),
    }
}

fn failure_code(message: &str) -> Option<i32> {
    message.rsplit(':').next()?.trim().parse().ok()
}
