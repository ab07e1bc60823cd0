//! Quadratic-penalty backend on argmin's Nelder-Mead.
//!
//! Minimizes `f(x) + mu * (sum max(0, g)^2 + sum h^2 + bound violation^2)`.
//! Equalities enter the penalty directly, so this backend accepts the
//! equality formulation as is.
//!
//! argmin caps iterations, not evaluations: the iteration cap is what is left
//! after the initial simplex, and the cost adapter stops consulting the
//! problem once the evaluation budget is spent.

use std::cell::Cell;
use std::time::Instant;

use argmin::core::{CostFunction, Executor};
use argmin::solver::neldermead::NelderMead;
use tracing::debug;

use super::{preflight, NlpProblem, NlpSolution, NlpSolver, StoppingCriteria, Termination};
use crate::error::SolveError;

#[derive(Debug, Clone)]
pub struct PenaltySolver {
    pub criteria: StoppingCriteria,
    /// Penalty weight `mu`.
    pub penalty_weight: f64,
    /// Edge length of the initial simplex.
    pub initial_step: f64,
}

impl Default for PenaltySolver {
    fn default() -> Self {
        Self {
            criteria: StoppingCriteria::default(),
            penalty_weight: 1e6,
            initial_step: 0.5,
        }
    }
}

impl PenaltySolver {
    pub fn new(criteria: StoppingCriteria) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }
}

/// Penalized objective handed to argmin.
struct PenalizedCost<'a> {
    problem: &'a dyn NlpProblem,
    bounds: Vec<(f64, f64)>,
    weight: f64,
    evaluations: &'a Cell<usize>,
    /// Evaluation budget; later calls score `f64::MAX` without evaluating.
    limit: usize,
}

impl PenalizedCost<'_> {
    fn evaluate(&self, x: &[f64]) -> f64 {
        if self.evaluations.get() >= self.limit {
            return f64::MAX;
        }
        self.evaluations.set(self.evaluations.get() + 1);

        let mut violation = 0.0;
        let mut g = vec![0.0; self.problem.inequality_count()];
        if self.problem.inequalities(x, &mut g).is_err() {
            return f64::MAX;
        }
        violation += g.iter().map(|r| r.max(0.0).powi(2)).sum::<f64>();

        let mut h = vec![0.0; self.problem.equality_count()];
        if self.problem.equalities(x, &mut h).is_err() {
            return f64::MAX;
        }
        violation += h.iter().map(|r| r * r).sum::<f64>();

        for (&xi, &(lo, hi)) in x.iter().zip(&self.bounds) {
            let out = (lo - xi).max(0.0) + (xi - hi).max(0.0);
            violation += out * out;
        }

        let total = self.problem.objective(x) + self.weight * violation;
        if total.is_finite() {
            total
        } else {
            f64::MAX
        }
    }
}

impl CostFunction for PenalizedCost<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        Ok(self.evaluate(params))
    }
}

fn simplex_around(x0: &[f64], step: f64) -> Vec<Vec<f64>> {
    let mut simplex = Vec::with_capacity(x0.len() + 1);
    simplex.push(x0.to_vec());
    for i in 0..x0.len() {
        let mut vertex = x0.to_vec();
        vertex[i] += step;
        simplex.push(vertex);
    }
    simplex
}

fn backend_error(err: argmin::core::Error) -> SolveError {
    SolveError::Backend {
        backend: "penalty",
        message: err.to_string(),
    }
}

impl NlpSolver for PenaltySolver {
    fn name(&self) -> &'static str {
        "penalty"
    }

    fn supports_equality(&self) -> bool {
        true
    }

    fn solve(&self, problem: &dyn NlpProblem, x0: &[f64]) -> Result<NlpSolution, SolveError> {
        preflight(problem, x0)?;
        let start = Instant::now();
        let evaluations = Cell::new(0usize);
        let cost = PenalizedCost {
            problem,
            bounds: problem.bounds(),
            weight: self.penalty_weight,
            evaluations: &evaluations,
            limit: self.criteria.max_evaluations,
        };

        if self.criteria.max_time.is_zero() || self.criteria.max_evaluations == 0 {
            let termination = if self.criteria.max_time.is_zero() {
                Termination::MaxTime
            } else {
                Termination::MaxEvaluations
            };
            return Ok(NlpSolution {
                x: x0.to_vec(),
                objective: problem.objective(x0),
                evaluations: 0,
                termination,
                elapsed: start.elapsed(),
            });
        }

        let solver = NelderMead::new(simplex_around(x0, self.initial_step))
            .with_sd_tolerance(self.criteria.ftol_abs)
            .map_err(backend_error)?;
        let max_iters = self
            .criteria
            .max_evaluations
            .saturating_sub(problem.dimension() + 1) as u64;
        let result = Executor::new(cost, solver)
            .configure(|state| state.max_iters(max_iters))
            .timeout(self.criteria.max_time)
            .run()
            .map_err(backend_error)?;

        let x = result
            .state()
            .best_param
            .clone()
            .unwrap_or_else(|| x0.to_vec());
        let elapsed = start.elapsed();
        let spent = evaluations.get();
        let termination = if elapsed >= self.criteria.max_time {
            Termination::MaxTime
        } else if spent >= self.criteria.max_evaluations {
            Termination::MaxEvaluations
        } else {
            Termination::Converged
        };
        debug!(evaluations = spent, ?termination, "nelder-mead finished");

        Ok(NlpSolution {
            objective: problem.objective(&x),
            x,
            evaluations: spent,
            termination,
            elapsed,
        })
    }
}
