use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;

use crate::convert::{
    column_ids, glpk_status, to_borrowed_objective, to_glpk_polyhedron, to_integer_le,
    IntegerLeSystem,
};
use crate::domain::model::OptimizationProblem;
use crate::domain::solver::{SolveOptions, SolveOutcome, SolveStatus, Solver};

use glpk_rust::{solve_ilps as glpk_solve_ilps, Solution};

const NO_TERMINAL_OUTPUT: bool = false;
const MAXIMIZE: bool = true;

/// Timed GLPK solves that may run at once.
pub const DEFAULT_MAX_TIMED_WORKERS: usize = 4;

/// GLPK solver implementation
///
/// GLPK takes integer `A x <= b` data, so the problem is lowered through
/// [`to_integer_le`] first.
///
/// GLPK cannot be interrupted. A time limit runs the solve on a worker thread
/// and stops waiting once the limit elapses, but the abandoned worker keeps its
/// CPU until GLPK finishes. Workers count against `max_timed_workers` until
/// they exit; a timed solve over that cap fails at once with a solver error.
/// The HiGHS backend honours its time limit natively and needs no workers.
pub struct GlpkSolver {
    running: Arc<AtomicUsize>,
    max_timed_workers: usize,
}

impl GlpkSolver {
    pub fn new() -> Self {
        Self::with_worker_limit(DEFAULT_MAX_TIMED_WORKERS)
    }

    pub fn with_worker_limit(max_timed_workers: usize) -> Self {
        GlpkSolver {
            running: Arc::new(AtomicUsize::new(0)),
            max_timed_workers,
        }
    }

    /// Timed workers still running, including abandoned ones.
    pub fn running_workers(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    fn claim_worker(&self) -> bool {
        self.running
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.max_timed_workers).then_some(n + 1)
            })
            .is_ok()
    }
}

impl Default for GlpkSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for GlpkSolver {
    fn solve(&self, problem: &OptimizationProblem, options: &SolveOptions) -> SolveOutcome {
        let system = match to_integer_le(problem) {
            Ok(system) => system,
            Err(error) => return SolveOutcome::failed(error.to_string()),
        };
        let objective = problem.objective().to_vec();

        let Some(limit) = options.time_limit else {
            return run_glpk(&system, &objective);
        };

        if !self.claim_worker() {
            log::warn!(
                "refusing timed GLPK solve: {} workers still running",
                self.running_workers()
            );
            return SolveOutcome::failed(format!(
                "{} GLPK workers still running",
                self.max_timed_workers
            ));
        }

        let (sender, receiver) = mpsc::channel();
        let running = Arc::clone(&self.running);
        let spawned = thread::Builder::new()
            .name("glpk-solve".to_string())
            .spawn(move || {
                let outcome = run_glpk(&system, &objective);
                running.fetch_sub(1, Ordering::SeqCst);
                // receiver may be gone after a timeout
                let _ = sender.send(outcome);
            });
        if let Err(error) = spawned {
            self.running.fetch_sub(1, Ordering::SeqCst);
            return SolveOutcome::failed(format!("failed to start GLPK worker: {}", error));
        }

        match receiver.recv_timeout(limit) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                log::warn!("GLPK did not finish within {:?}", limit);
                SolveOutcome::failed(format!("time limit of {:?} reached", limit))
            }
            Err(RecvTimeoutError::Disconnected) => {
                SolveOutcome::failed("GLPK worker stopped without a result")
            }
        }
    }

    fn name(&self) -> &str {
        "GLPK"
    }
}

fn run_glpk(system: &IntegerLeSystem, objective: &[f64]) -> SolveOutcome {
    let ids = column_ids(system.ncols);
    let column_of: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(column, id)| (id.as_str(), column))
        .collect();

    // Solver expects &mut
    let mut polyhedron = to_glpk_polyhedron(system, &ids);
    let objectives = vec![to_borrowed_objective(&ids, objective)];

    let mut solutions: Vec<Solution> =
        glpk_solve_ilps(&mut polyhedron, objectives, MAXIMIZE, NO_TERMINAL_OUTPUT);
    let Some(solution) = solutions.pop() else {
        return SolveOutcome::failed("GLPK returned no solution");
    };

    let status = glpk_status(solution.status, solution.error.as_deref());
    if status != SolveStatus::Optimal {
        return SolveOutcome::verdict(status, solution.error);
    }

    let mut assignment = vec![0.0; system.ncols];
    for (id, value) in solution.solution {
        match column_of.get(id.as_str()).and_then(|&column| assignment.get_mut(column)) {
            Some(slot) => *slot = value as f64,
            None => return SolveOutcome::failed(format!("GLPK returned unknown variable `{}`", id)),
        }
    }
    SolveOutcome::optimal(assignment)
}
