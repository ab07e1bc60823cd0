//! Optimization driver: owns parameters and guess, runs the configured
//! backend and decodes the result.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::problem::{Formulation, GliderProblem};
use super::result::{SolveOutcome, TrajectoryResult};
use crate::collocation::{inequality_residuals, layout, ConstraintReport};
use crate::config::ParameterDocument;
use crate::error::{ConfigError, LayoutError, OptimizeError};
use crate::nlp::{CobylaSolver, NlpProblem, NlpSolver, PenaltySolver, StoppingCriteria};
use crate::vehicle::{BoundarySpec, PhysicalParameters, StateWeight};

// ---------------------------------------------------------------------------
// Solver configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Cobyla,
    Penalty,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Cobyla => write!(f, "cobyla"),
            Backend::Penalty => write!(f, "penalty"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cobyla" => Ok(Backend::Cobyla),
            "penalty" | "nelder-mead" => Ok(Backend::Penalty),
            other => Err(format!("unknown backend `{other}` (cobyla, penalty)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub backend: Backend,
    pub formulation: Formulation,
    pub criteria: StoppingCriteria,
    pub rho_begin: f64,
    pub evaluations_per_restart: usize,
    pub penalty_weight: f64,
    pub bound_variables: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            formulation: Formulation::default(),
            criteria: StoppingCriteria::default(),
            rho_begin: 0.5,
            evaluations_per_restart: 250,
            penalty_weight: 1e6,
            bound_variables: true,
        }
    }
}

impl SolverConfig {
    pub fn max_evaluations(mut self, v: usize) -> Self { self.criteria.max_evaluations = v; self }
    pub fn max_time(mut self, v: Duration) -> Self { self.criteria.max_time = v; self }
    pub fn backend(mut self, v: Backend) -> Self { self.backend = v; self }
    pub fn formulation(mut self, v: Formulation) -> Self { self.formulation = v; self }

    /// Instantiate the backend. `equality_tolerance` is the fallback band for
    /// equalities the problem gives no band of its own.
    pub fn build_solver(&self, equality_tolerance: f64) -> Box<dyn NlpSolver> {
        match self.backend {
            Backend::Cobyla => Box::new(CobylaSolver {
                criteria: self.criteria.clone(),
                rho_begin: self.rho_begin,
                evaluations_per_restart: self.evaluations_per_restart,
                equality_tolerance,
            }),
            Backend::Penalty => Box::new(PenaltySolver {
                criteria: self.criteria.clone(),
                penalty_weight: self.penalty_weight,
                initial_step: self.rho_begin,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Stateful driver
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TrajectoryOptimizer {
    problem: Option<(PhysicalParameters, BoundarySpec)>,
    guess: Vec<f64>,
    config: SolverConfig,
}

impl TrajectoryOptimizer {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Load the parameter document at `path` and derive the timestep as
    /// `total_duration / knots`. On error the previous parameters are kept.
    #[allow(clippy::too_many_arguments)]
    pub fn load_parameters(
        &mut self,
        path: &Path,
        total_duration: f64,
        knots: usize,
        state_weight: StateWeight,
        control_weight: f64,
        initial_x: Vec<f64>,
        initial_z: Vec<f64>,
    ) -> Result<(), ConfigError> {
        if knots == 0 {
            return Err(ConfigError::invalid("knots", "must be at least 1"));
        }
        let doc = ParameterDocument::load(path)?;
        let timestep = total_duration / knots as f64;
        let params = doc.to_parameters(timestep, state_weight, control_weight);
        let boundary = doc.boundary(initial_x, initial_z);
        self.set_parameters(params, boundary)?;
        info!(path = %path.display(), knots, timestep, "loaded glider parameters");
        Ok(())
    }

    pub fn set_parameters(
        &mut self,
        params: PhysicalParameters,
        boundary: BoundarySpec,
    ) -> Result<(), ConfigError> {
        params.validate()?;
        boundary.validate()?;
        self.problem = Some((params, boundary));
        Ok(())
    }

    /// Store the initial guess and return its knot count. A length that is
    /// not a multiple of 8 leaves the stored guess untouched.
    pub fn load_initial_guess(&mut self, guess: Vec<f64>) -> Result<usize, LayoutError> {
        let knots = layout::knot_count(guess.len())?;
        self.guess = guess;
        info!(entries = self.guess.len(), knots, "loaded initial guess");
        Ok(knots)
    }

    pub fn guess(&self) -> &[f64] {
        &self.guess
    }

    pub fn parameters(&self) -> Option<&PhysicalParameters> {
        self.problem.as_ref().map(|(p, _)| p)
    }

    pub fn boundary(&self) -> Option<&BoundarySpec> {
        self.problem.as_ref().map(|(_, b)| b)
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SolverConfig {
        &mut self.config
    }

    pub fn optimize(&self) -> Result<SolveOutcome, OptimizeError> {
        if self.guess.is_empty() {
            info!("empty initial guess, nothing to optimize");
            return Ok(SolveOutcome::default());
        }
        let (params, boundary) = self
            .problem
            .as_ref()
            .ok_or(OptimizeError::ParametersMissing)?;
        solve(params, boundary, &self.guess, &self.config)
    }
}

// ---------------------------------------------------------------------------
// One-shot solve
// ---------------------------------------------------------------------------

/// Optimize `guess` against `params` and `boundary`.
///
/// Hitting an evaluation or time budget is not an error: the outcome carries
/// the best point found, why the search stopped and how feasible it is.
pub fn solve(
    params: &PhysicalParameters,
    boundary: &BoundarySpec,
    guess: &[f64],
    config: &SolverConfig,
) -> Result<SolveOutcome, OptimizeError> {
    let knots = layout::knot_count(guess.len())?;
    if knots == 0 {
        return Ok(SolveOutcome::default());
    }
    params.validate()?;
    boundary.validate()?;

    let problem = GliderProblem::new(params, boundary, knots)
        .formulation(config.formulation)
        .bound_variables(config.bound_variables);
    let solver = config.build_solver(boundary.defect_tolerance);
    if config.formulation == Formulation::Equality && !solver.supports_equality() {
        debug!(backend = solver.name(), "backend splits equalities into tolerance pairs");
    }

    info!(
        knots,
        variables = problem.dimension(),
        inequalities = problem.inequality_count(),
        equalities = problem.equality_count(),
        backend = solver.name(),
        formulation = %config.formulation,
        "starting trajectory optimization"
    );
    let initial_cost = problem.objective(guess);
    let solution = solver.solve(&problem, guess)?;
    log_knot_deltas(guess, &solution.x);

    let residuals = inequality_residuals(&solution.x, params, boundary)?;
    let constraints = ConstraintReport::from_residuals(&residuals);
    if !constraints.is_feasible() {
        warn!(
            violated = constraints.violated,
            max_violation = constraints.max_violation,
            worst = ?constraints.worst_index,
            "returned trajectory violates constraints"
        );
    }
    info!(
        evaluations = solution.evaluations,
        initial_cost,
        cost = solution.objective,
        termination = solution.termination.as_str(),
        elapsed_ms = solution.elapsed.as_millis() as u64,
        "trajectory optimization finished"
    );

    Ok(SolveOutcome {
        trajectory: TrajectoryResult::from_decision_vector(&solution.x)?,
        objective: solution.objective,
        evaluations: solution.evaluations,
        termination: solution.termination,
        elapsed: solution.elapsed,
        constraints,
    })
}

fn log_knot_deltas(guess: &[f64], optimized: &[f64]) {
    for (i, (before, after)) in layout::knots(guess)
        .zip(layout::knots(optimized))
        .enumerate()
    {
        let delta = after.state.to_vector() - before.state.to_vector();
        debug!(
            knot = i,
            dx = delta[0],
            dz = delta[1],
            dtheta = delta[2],
            dphi = delta[3],
            dvx = delta[4],
            dvz = delta[5],
            dthetadot = delta[6],
            dphidot = after.phidot - before.phidot,
            "knot moved from guess"
        );
    }
}
