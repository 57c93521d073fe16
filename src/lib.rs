//! Fantasy football squad selection as a binary integer program.
//!
//! Raw player rows are normalized into [`PlayerRecord`]s, squad rules are
//! validated into a [`ConstraintSet`], and the resulting
//! [`OptimizationProblem`] is handed to a [`Solver`] backend. The solver's
//! assignment is mapped back to players and re-verified as a [`SquadResult`].

pub mod config;
pub mod convert;
pub mod domain;
pub mod handlers;
pub mod load;
pub mod models;

pub use domain::constraints::{build_constraint_set, ClubCap, ConstraintSet, QuotaMode, SquadConfig};
pub use domain::error::{ConfigError, DataError, EngineError};
pub use domain::extract::{extract, SquadResult};
pub use domain::model::{build_problem, OptimizationProblem};
pub use domain::normalize::{
    normalize, project_rows, revalue, NormalizeOptions, NormalizedPool, RawPlayerRow,
};
pub use domain::objective::ObjectiveMetric;
pub use domain::player::{PlayerId, PlayerRecord, Position};
pub use domain::solve::SquadOptimizer;
pub use domain::solver::{SolveOptions, SolveOutcome, SolveStatus, Solver};
pub use domain::solver_factory::{create_solver, SolverType};
