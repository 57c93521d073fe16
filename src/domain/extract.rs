use serde::Serialize;
use std::cmp::Ordering;

use crate::domain::constraints::ConstraintSet;
use crate::domain::error::EngineError;
use crate::domain::model::OptimizationProblem;
use crate::domain::player::PlayerRecord;
use crate::domain::solver::{SolveOutcome, SolveStatus};
use crate::domain::validate::verify_selection;

/// Decision values at or above this count as selected.
const SELECTED_THRESHOLD: f64 = 0.5;

/// Outcome of one optimization run. `selected` is empty unless `status` is optimal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadResult {
    pub status: SolveStatus,
    pub selected: Vec<PlayerRecord>,
    pub total_price: f64,
    pub total_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SquadResult {
    pub fn without_squad(status: SolveStatus, detail: Option<String>) -> Self {
        SquadResult {
            status,
            selected: Vec::new(),
            total_price: 0.0,
            total_value: 0.0,
            detail,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }
}

/// Map a solver outcome back onto the pool the problem was built from.
///
/// An optimal selection that breaks any rule is an internal error: the model
/// and the checks here disagree, so the result cannot be trusted.
pub fn extract(
    outcome: SolveOutcome,
    problem: &OptimizationProblem,
    pool: &[PlayerRecord],
    constraints: &ConstraintSet,
) -> Result<SquadResult, EngineError> {
    let assignment = match (outcome.status, outcome.assignment) {
        (SolveStatus::Optimal, Some(assignment)) => assignment,
        (SolveStatus::Optimal, None) => {
            return Err(EngineError::Verification(
                "optimal status without an assignment".to_string(),
            ))
        }
        (status, _) => return Ok(SquadResult::without_squad(status, outcome.detail)),
    };

    if assignment.len() != problem.num_columns() {
        return Err(EngineError::Verification(format!(
            "assignment has {} values for {} columns",
            assignment.len(),
            problem.num_columns()
        )));
    }

    let mut selected = Vec::new();
    for (column, &x) in assignment.iter().enumerate() {
        if x < SELECTED_THRESHOLD {
            continue;
        }
        let player = problem
            .player_at(column)
            .and_then(|id| pool.get(column).filter(|p| p.id == id))
            .ok_or_else(|| {
                EngineError::Verification(format!("column {} does not map to the pool", column))
            })?;
        selected.push(player.clone());
    }

    verify_selection(&selected, constraints).map_err(EngineError::Verification)?;

    selected.sort_by(display_order);
    let total_price = selected.iter().map(|p| p.price).sum();
    let total_value = selected.iter().map(|p| p.value).sum();

    Ok(SquadResult {
        status: SolveStatus::Optimal,
        selected,
        total_price,
        total_value,
        detail: None,
    })
}

/// Position, then descending value, then ascending id.
fn display_order(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
    a.position
        .cmp(&b.position)
        .then_with(|| b.value.total_cmp(&a.value))
        .then_with(|| a.id.cmp(&b.id))
}
