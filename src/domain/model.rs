use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::domain::constraints::{ConstraintSet, QuotaMode};
use crate::domain::error::ConfigError;
use crate::domain::player::{PlayerId, PlayerRecord, Position};
use crate::domain::validate::check_position_supply;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparison {
    LessEq,
    GreaterEq,
    Equal,
}

/// Which squad rule a constraint row encodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConstraintLabel {
    Position(Position),
    Budget,
    SquadSize,
    Club(String),
}

impl fmt::Display for ConstraintLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintLabel::Position(position) => write!(f, "{} quota", position),
            ConstraintLabel::Budget => f.write_str("budget"),
            ConstraintLabel::SquadSize => f.write_str("squad size"),
            ConstraintLabel::Club(club) => write!(f, "club {}", club),
        }
    }
}

/// `Σ coefficient · x[column]  (<=|>=|==)  rhs`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearConstraint {
    pub label: ConstraintLabel,
    pub terms: Vec<(usize, f64)>,
    pub comparison: Comparison,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn is_satisfied_by(&self, assignment: &[f64]) -> bool {
        let lhs: f64 = self
            .terms
            .iter()
            .map(|&(column, coefficient)| coefficient * assignment.get(column).copied().unwrap_or(0.0))
            .sum();
        match self.comparison {
            Comparison::LessEq => lhs <= self.rhs + 1e-6,
            Comparison::GreaterEq => lhs >= self.rhs - 1e-6,
            Comparison::Equal => (lhs - self.rhs).abs() <= 1e-6,
        }
    }
}

/// A binary maximization problem over one column per player.
///
/// Immutable once built. Column `i` always stands for `players()[i]`; the
/// reverse lookup from player id to column is built once here.
#[derive(Debug, Clone)]
pub struct OptimizationProblem {
    columns: Vec<PlayerId>,
    column_of: HashMap<PlayerId, usize>,
    objective: Vec<f64>,
    constraints: Vec<LinearConstraint>,
}

impl OptimizationProblem {
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Player id behind a column.
    pub fn player_at(&self, column: usize) -> Option<PlayerId> {
        self.columns.get(column).copied()
    }

    pub fn column_of(&self, id: PlayerId) -> Option<usize> {
        self.column_of.get(&id).copied()
    }

    pub fn objective_value(&self, assignment: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(assignment)
            .map(|(coefficient, x)| coefficient * x)
            .sum()
    }
}

/// Build the binary program for `pool` under `constraints`.
///
/// Fails when a position quota cannot be met by the pool at all, before any
/// solver is involved.
pub fn build_problem(
    pool: &[PlayerRecord],
    constraints: &ConstraintSet,
) -> Result<OptimizationProblem, ConfigError> {
    if pool.is_empty() {
        return Err(ConfigError::EmptyPool);
    }
    check_position_supply(pool, constraints)?;

    let columns: Vec<PlayerId> = pool.iter().map(|p| p.id).collect();
    let column_of: HashMap<PlayerId, usize> = columns
        .iter()
        .enumerate()
        .map(|(column, &id)| (id, column))
        .collect();
    let objective: Vec<f64> = pool.iter().map(|p| p.value).collect();

    let mut rows = Vec::new();

    for (&position, &quota) in &constraints.position_quotas {
        let comparison = match constraints.quota_mode {
            QuotaMode::Exact => Comparison::Equal,
            QuotaMode::Minimum if quota == 0 => continue,
            QuotaMode::Minimum => Comparison::GreaterEq,
        };
        let terms = indicator_terms(pool, |p| p.position == position);
        // supply check guarantees an empty row has quota 0
        if terms.is_empty() {
            continue;
        }
        rows.push(LinearConstraint {
            label: ConstraintLabel::Position(position),
            terms,
            comparison,
            rhs: f64::from(quota),
        });
    }

    rows.push(LinearConstraint {
        label: ConstraintLabel::Budget,
        terms: pool
            .iter()
            .enumerate()
            .map(|(column, p)| (column, constraints.price_units(p.price) as f64))
            .collect(),
        comparison: Comparison::LessEq,
        rhs: constraints.budget_units() as f64,
    });

    rows.push(LinearConstraint {
        label: ConstraintLabel::SquadSize,
        terms: indicator_terms(pool, |_| true),
        comparison: Comparison::Equal,
        rhs: f64::from(constraints.squad_size),
    });

    for (club, &cap) in &constraints.club_caps {
        let terms = indicator_terms(pool, |p| &p.team == club);
        if terms.is_empty() {
            continue;
        }
        rows.push(LinearConstraint {
            label: ConstraintLabel::Club(club.clone()),
            terms,
            comparison: Comparison::LessEq,
            rhs: f64::from(cap),
        });
    }

    log::debug!(
        "built problem with {} columns and {} constraint rows",
        columns.len(),
        rows.len()
    );

    Ok(OptimizationProblem {
        columns,
        column_of,
        objective,
        constraints: rows,
    })
}

fn indicator_terms(pool: &[PlayerRecord], include: impl Fn(&PlayerRecord) -> bool) -> Vec<(usize, f64)> {
    pool.iter()
        .enumerate()
        .filter(|(_, p)| include(p))
        .map(|(column, _)| (column, 1.0))
        .collect()
}
