use log::{debug, info};

use crate::domain::constraints::{build_constraint_set, SquadConfig};
use crate::domain::error::EngineError;
use crate::domain::extract::{extract, SquadResult};
use crate::domain::model::build_problem;
use crate::domain::normalize::{project_rows, revalue, NormalizeOptions, NormalizedPool, RawPlayerRow};
use crate::domain::objective::ObjectiveMetric;
use crate::domain::player::PlayerRecord;
use crate::domain::solver::{SolveOptions, Solver};

/// Runs the squad pipeline against one solver backend.
///
/// Holds no state between runs; concurrent calls each build their own problem.
pub struct SquadOptimizer {
    solver: Box<dyn Solver>,
    options: SolveOptions,
}

/// One objective's run over a shared normalized pool.
#[derive(Debug, Clone)]
pub struct ObjectiveRun {
    pub objective: ObjectiveMetric,
    /// The pool as valued for this objective, with any rows it had to drop.
    pub pool: NormalizedPool,
    pub result: SquadResult,
}

impl SquadOptimizer {
    pub fn new(solver: Box<dyn Solver>, options: SolveOptions) -> Self {
        SquadOptimizer { solver, options }
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    /// Constraint set, model, solve, and extraction for an already valued pool.
    pub fn optimize(
        &self,
        pool: &[PlayerRecord],
        config: &SquadConfig,
    ) -> Result<SquadResult, EngineError> {
        let constraints = build_constraint_set(pool, config)?;
        let problem = build_problem(pool, &constraints)?;

        debug!(
            "solving {} players / {} rows with {}",
            problem.num_columns(),
            problem.constraints().len(),
            self.solver.name()
        );
        let outcome = self.solver.solve(&problem, &self.options);
        let result = extract(outcome, &problem, pool, &constraints)?;

        info!(
            "{} squad: status={} players={} total_price={:.2} total_value={:.2}",
            self.solver.name(),
            result.status,
            result.selected.len(),
            result.total_price,
            result.total_value
        );
        Ok(result)
    }

    /// Normalize `rows` once, then value and optimize the pool for each
    /// objective in turn.
    ///
    /// Every objective starts from the same structurally valid pool, so a row
    /// one objective cannot value is still available to the others and the
    /// runs do not depend on the order of `objectives`.
    pub fn optimize_objectives(
        &self,
        rows: &[RawPlayerRow],
        config: &SquadConfig,
        objectives: &[ObjectiveMetric],
        options: &NormalizeOptions,
    ) -> Result<Vec<ObjectiveRun>, EngineError> {
        let base = project_rows(rows, options);
        debug!(
            "projected {} rows: {} players, {} rejected, {} filtered",
            rows.len(),
            base.players.len(),
            base.rejected.len(),
            base.filtered
        );

        objectives
            .iter()
            .map(|objective| {
                let pool = revalue(&base, objective);
                let result = self.optimize(&pool.players, config)?;
                Ok(ObjectiveRun {
                    objective: objective.clone(),
                    pool,
                    result,
                })
            })
            .collect()
    }
}
