//! Nonlinear-program capability interface.
//!
//! A problem exposes an objective, inequality residuals (`<= 0` feasible),
//! equality residuals (`= 0`) and variable bounds. A solver minimizes it from
//! an initial guess and always hands back its best point, with the reason it
//! stopped. Transcription and backend vary independently: a backend without
//! native equality support splits equalities into tolerance pairs itself.

use std::time::Duration;

use serde::Serialize;

use crate::error::{LayoutError, SolveError};

pub mod cobyla_solver;
pub mod penalty;

pub use cobyla_solver::CobylaSolver;
pub use penalty::PenaltySolver;

/// Minimize `objective(x)` subject to `inequalities(x) <= 0`,
/// `equalities(x) = 0` and `bounds`.
pub trait NlpProblem {
    fn dimension(&self) -> usize;

    fn objective(&self, x: &[f64]) -> f64;

    fn inequality_count(&self) -> usize;

    fn inequalities(&self, x: &[f64], out: &mut [f64]) -> Result<(), LayoutError>;

    fn equality_count(&self) -> usize {
        0
    }

    fn equalities(&self, _x: &[f64], _out: &mut [f64]) -> Result<(), LayoutError> {
        Ok(())
    }

    /// Band half-width for equality `index` when a backend has to split it
    /// into an inequality pair. `None` defers to the backend's default.
    fn equality_tolerance(&self, _index: usize) -> Option<f64> {
        None
    }

    /// Per-variable `(lower, upper)`; unbounded by default.
    fn bounds(&self) -> Vec<(f64, f64)> {
        vec![(f64::NEG_INFINITY, f64::INFINITY); self.dimension()]
    }
}

/// Why a backend stopped. Every variant comes with a best-effort point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// No solve was run (empty problem).
    #[default]
    Skipped,
    /// A function-value or parameter-change threshold was met.
    Converged,
    MaxEvaluations,
    MaxTime,
    /// The backend gave up early (roundoff, degenerate step).
    Stalled,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::Skipped => "skipped",
            Termination::Converged => "converged",
            Termination::MaxEvaluations => "max_evaluations",
            Termination::MaxTime => "max_time",
            Termination::Stalled => "stalled",
        }
    }
}

/// Convergence thresholds and budgets shared by all backends.
#[derive(Debug, Clone, PartialEq)]
pub struct StoppingCriteria {
    pub ftol_rel: f64,
    pub ftol_abs: f64,
    pub xtol_rel: f64,
    pub max_evaluations: usize,
    pub max_time: Duration,
}

impl Default for StoppingCriteria {
    fn default() -> Self {
        Self {
            ftol_rel: 1e-6,
            ftol_abs: 1e-6,
            xtol_rel: 1e-4,
            max_evaluations: 1000,
            max_time: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NlpSolution {
    pub x: Vec<f64>,
    pub objective: f64,
    /// Objective evaluations spent.
    pub evaluations: usize,
    pub termination: Termination,
    pub elapsed: Duration,
}

pub trait NlpSolver {
    fn name(&self) -> &'static str;

    fn supports_equality(&self) -> bool;

    fn solve(&self, problem: &dyn NlpProblem, x0: &[f64]) -> Result<NlpSolution, SolveError>;
}

/// Shared pre-flight: dimension check plus one evaluation of every residual
/// block so sizing errors surface before the search starts.
pub(crate) fn preflight(problem: &dyn NlpProblem, x0: &[f64]) -> Result<(), SolveError> {
    if x0.len() != problem.dimension() {
        return Err(SolveError::DimensionMismatch {
            expected: problem.dimension(),
            got: x0.len(),
        });
    }
    let mut ineq = vec![0.0; problem.inequality_count()];
    problem.inequalities(x0, &mut ineq)?;
    let mut eq = vec![0.0; problem.equality_count()];
    problem.equalities(x0, &mut eq)?;
    let bounds = problem.bounds();
    if bounds.len() != problem.dimension() {
        return Err(LayoutError::BufferSize {
            what: "bounds",
            expected: problem.dimension(),
            got: bounds.len(),
        }
        .into());
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_problems::*;
    use super::*;

    #[test]
    fn preflight_rejects_wrong_dimension() {
        let err = preflight(&Paraboloid { with_equality: false }, &[0.0]).unwrap_err();
        assert!(matches!(err, SolveError::DimensionMismatch { expected: 2, got: 1 }));
    }

    #[test]
    fn preflight_surfaces_sizing_errors() {
        let err = preflight(&Miscounted, &[0.0]).unwrap_err();
        assert!(matches!(err, SolveError::Layout(LayoutError::BufferSize { .. })));
    }

    #[test]
    fn default_bounds_are_open() {
        let b = Paraboloid { with_equality: false }.bounds();
        assert_eq!(b, vec![(f64::NEG_INFINITY, f64::INFINITY); 2]);
    }
}
