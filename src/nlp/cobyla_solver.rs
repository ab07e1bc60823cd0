//! COBYLA backend (derivative-free, inequality constraints only).
//!
//! The `cobyla` crate takes one scalar callback per constraint, with the
//! convention `c(x) >= 0`. The adapter evaluates the problem's residual
//! blocks once per candidate point and serves every constraint callback from
//! that evaluation. Equalities are split into `|h| <= tol` pairs.
//!
//! `cobyla` has no wall-clock stop, so the evaluation budget is spent in
//! restart chunks, each warm-started from the previous best point. Every
//! chunk is sized from the measured cost of the earlier ones so that it is
//! expected to end inside the time left.

use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

use cobyla::{minimize, RhoBeg, StopTols, SuccessStatus};
use tracing::{debug, warn};

use super::{preflight, NlpProblem, NlpSolution, NlpSolver, StoppingCriteria, Termination};
use crate::error::SolveError;

/// Finite stand-in for an open variable bound.
pub const OPEN_BOUND: f64 = 1e8;

/// Finite stand-in for a non-finite objective or residual.
const NON_FINITE_VALUE: f64 = 1e20;

#[derive(Debug, Clone)]
pub struct CobylaSolver {
    pub criteria: StoppingCriteria,
    /// Initial trust-region radius.
    pub rho_begin: f64,
    /// Objective evaluations per restart chunk.
    pub evaluations_per_restart: usize,
    /// Half-width of the band used for equality constraints.
    pub equality_tolerance: f64,
}

impl Default for CobylaSolver {
    fn default() -> Self {
        Self {
            criteria: StoppingCriteria::default(),
            rho_begin: 0.5,
            evaluations_per_restart: 250,
            equality_tolerance: 0.01,
        }
    }
}

impl CobylaSolver {
    pub fn new(criteria: StoppingCriteria) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }

    fn stop_tols(&self) -> StopTols {
        StopTols {
            ftol_rel: self.criteria.ftol_rel,
            ftol_abs: self.criteria.ftol_abs,
            xtol_rel: self.criteria.xtol_rel,
            ..StopTols::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Residual cache shared by the per-constraint callbacks
// ---------------------------------------------------------------------------

struct ResidualCache {
    point: Vec<f64>,
    inequalities: Vec<f64>,
    equalities: Vec<f64>,
    /// Band half-width per equality.
    tolerances: Vec<f64>,
    filled: bool,
}

impl ResidualCache {
    fn new(problem: &dyn NlpProblem, default_tolerance: f64) -> Self {
        let equality_count = problem.equality_count();
        Self {
            point: Vec::with_capacity(problem.dimension()),
            inequalities: vec![0.0; problem.inequality_count()],
            equalities: vec![0.0; equality_count],
            tolerances: (0..equality_count)
                .map(|i| problem.equality_tolerance(i).unwrap_or(default_tolerance))
                .collect(),
            filled: false,
        }
    }

    fn refresh(&mut self, problem: &dyn NlpProblem, x: &[f64]) {
        if self.filled && self.point.as_slice() == x {
            return;
        }
        self.point.clear();
        self.point.extend_from_slice(x);
        // Sizes were checked in preflight; a late failure reads as infeasible.
        if problem.inequalities(x, &mut self.inequalities).is_err() {
            self.inequalities.fill(f64::INFINITY);
        }
        if problem.equalities(x, &mut self.equalities).is_err() {
            self.equalities.fill(f64::INFINITY);
        }
        self.filled = true;
    }

    /// Constraint `k` in cobyla's `>= 0` convention. Inequalities come first,
    /// then a (lower, upper) pair per equality.
    fn value(&mut self, problem: &dyn NlpProblem, x: &[f64], k: usize) -> f64 {
        self.refresh(problem, x);
        let m = self.inequalities.len();
        let residual = if k < m {
            self.inequalities[k]
        } else {
            let e = (k - m) / 2;
            let (h, tol) = (self.equalities[e], self.tolerances[e]);
            if (k - m) % 2 == 0 {
                -h - tol
            } else {
                h - tol
            }
        };
        -finite_or_large(residual)
    }
}

fn finite_or_large(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        NON_FINITE_VALUE
    }
}

/// Open bounds replaced by `OPEN_BOUND`; cobyla turns every bound into a
/// constraint and cannot work with infinities.
fn finite_bounds(bounds: &[(f64, f64)]) -> Vec<(f64, f64)> {
    bounds
        .iter()
        .map(|&(lo, hi)| {
            let lo = if lo.is_finite() { lo } else { -OPEN_BOUND };
            let hi = if hi.is_finite() { hi } else { OPEN_BOUND };
            (lo, hi)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Restart sizing
// ---------------------------------------------------------------------------

/// Chunk sizes from the measured cost of earlier chunks.
///
/// A chunk spends `n + 1` evaluations on its initial simplex before the
/// first trust-region step. The shortest chunk so far bounds that setup
/// time, the slowest step rate bounds the rest.
#[derive(Debug, Clone, Copy)]
struct ChunkClock {
    setup: usize,
    setup_time: Option<Duration>,
    per_step: Option<Duration>,
}

impl ChunkClock {
    fn new(dimension: usize) -> Self {
        Self {
            setup: dimension + 1,
            setup_time: None,
            per_step: None,
        }
    }

    /// Smallest chunk that takes a step: simplex plus one.
    fn floor(&self) -> usize {
        self.setup + 1
    }

    fn record(&mut self, evaluations: usize, elapsed: Duration) {
        let steps = evaluations.saturating_sub(self.setup).max(1) as u32;
        let per_step = elapsed / steps;
        self.per_step = Some(self.per_step.map_or(per_step, |p| p.max(per_step)));
        self.setup_time = Some(self.setup_time.map_or(elapsed, |t| t.min(elapsed)));
    }

    /// Largest chunk expected to end within `time_left`; `None` when not
    /// even the floor fits. Before any measurement the floor is returned.
    fn chunk_for(&self, time_left: Duration) -> Option<usize> {
        let (Some(setup_time), Some(per_step)) = (self.setup_time, self.per_step) else {
            return Some(self.floor());
        };
        let budget = time_left.checked_sub(setup_time)?;
        if per_step.is_zero() {
            return Some(usize::MAX);
        }
        let steps = (budget.as_secs_f64() / per_step.as_secs_f64()) as usize;
        (steps >= 1).then(|| self.setup.saturating_add(steps))
    }
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

impl NlpSolver for CobylaSolver {
    fn name(&self) -> &'static str {
        "cobyla"
    }

    fn supports_equality(&self) -> bool {
        false
    }

    fn solve(&self, problem: &dyn NlpProblem, x0: &[f64]) -> Result<NlpSolution, SolveError> {
        preflight(problem, x0)?;
        let start = Instant::now();

        let constraint_count = problem.inequality_count() + 2 * problem.equality_count();
        let cache = RefCell::new(ResidualCache::new(problem, self.equality_tolerance));
        let evaluations = Cell::new(0usize);

        let objective = |x: &[f64], _data: &mut ()| {
            evaluations.set(evaluations.get() + 1);
            finite_or_large(problem.objective(x))
        };
        let constraints: Vec<_> = (0..constraint_count)
            .map(|k| {
                let cache = &cache;
                move |x: &[f64], _data: &mut ()| cache.borrow_mut().value(problem, x, k)
            })
            .collect();

        let bounds = finite_bounds(&problem.bounds());
        let mut clock = ChunkClock::new(problem.dimension());
        let cap = self.evaluations_per_restart.max(clock.floor());
        let mut x = x0.to_vec();
        let mut restarts = 0usize;

        let termination = loop {
            let remaining = self
                .criteria
                .max_evaluations
                .saturating_sub(evaluations.get());
            if remaining == 0 {
                break Termination::MaxEvaluations;
            }
            let time_left = self.criteria.max_time.saturating_sub(start.elapsed());
            if time_left.is_zero() {
                break Termination::MaxTime;
            }
            let Some(sized) = clock.chunk_for(time_left) else {
                debug!(restarts, ?time_left, "time left cannot fund another restart");
                break Termination::MaxTime;
            };
            let chunk = sized.min(cap).min(remaining);

            let spent_before = evaluations.get();
            let chunk_start = Instant::now();
            let outcome = minimize(
                &objective,
                &x,
                &bounds,
                &constraints,
                (),
                chunk,
                RhoBeg::All(self.rho_begin),
                Some(self.stop_tols()),
            );
            clock.record(evaluations.get() - spent_before, chunk_start.elapsed());
            restarts += 1;

            match outcome {
                Ok((status, x_opt, f_opt)) => {
                    x = x_opt;
                    match status {
                        SuccessStatus::MaxEvalReached => {
                            debug!(restarts, chunk, evaluations = evaluations.get(), cost = f_opt, "cobyla chunk exhausted");
                            continue;
                        }
                        SuccessStatus::MaxTimeReached => break Termination::MaxTime,
                        _ => break Termination::Converged,
                    }
                }
                Err((status, x_opt, _)) => {
                    warn!(?status, "cobyla stopped early, keeping best point");
                    x = x_opt;
                    break Termination::Stalled;
                }
            }
        };

        Ok(NlpSolution {
            objective: problem.objective(&x),
            x,
            evaluations: evaluations.get(),
            termination,
            elapsed: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayoutError;
    use crate::nlp::test_problems::Paraboloid;

    fn solver(max_evaluations: usize) -> CobylaSolver {
        CobylaSolver {
            criteria: StoppingCriteria {
                ftol_rel: 1e-10,
                ftol_abs: 1e-12,
                xtol_rel: 1e-8,
                max_evaluations,
                max_time: Duration::from_secs(5),
            },
            rho_begin: 0.5,
            evaluations_per_restart: max_evaluations,
            equality_tolerance: 1e-6,
        }
    }

    #[test]
    fn reaches_constrained_optimum() {
        let sol = solver(2000)
            .solve(&Paraboloid { with_equality: false }, &[0.0, 0.0])
            .unwrap();
        // min (x0-2)^2 + (x1-1)^2 on x0 + x1 <= 2 is (1.5, 0.5).
        assert!((sol.x[0] - 1.5).abs() < 1e-3, "x = {:?}", sol.x);
        assert!((sol.x[1] - 0.5).abs() < 1e-3, "x = {:?}", sol.x);
        assert!(sol.evaluations > 0);
    }

    #[test]
    fn equality_is_split_into_pairs() {
        let sol = solver(2000)
            .solve(&Paraboloid { with_equality: true }, &[0.0, 0.0])
            .unwrap();
        assert!((sol.x[0] - 1.0).abs() < 1e-3, "x = {:?}", sol.x);
        assert!((sol.x[1] - 1.0).abs() < 1e-3, "x = {:?}", sol.x);
    }

    #[test]
    fn evaluation_budget_is_respected() {
        let sol = solver(5)
            .solve(&Paraboloid { with_equality: false }, &[0.0, 0.0])
            .unwrap();
        assert_eq!(sol.termination, Termination::MaxEvaluations);
        assert!(sol.evaluations <= 6, "spent {}", sol.evaluations);
    }

    #[test]
    fn zero_time_budget_returns_guess() {
        let mut s = solver(100);
        s.criteria.max_time = Duration::ZERO;
        let sol = s
            .solve(&Paraboloid { with_equality: false }, &[0.25, 0.5])
            .unwrap();
        assert_eq!(sol.termination, Termination::MaxTime);
        assert_eq!(sol.x, vec![0.25, 0.5]);
        assert_eq!(sol.evaluations, 0);
    }

    #[test]
    fn cache_serves_pairs_for_equalities() {
        let problem = Paraboloid { with_equality: true };
        let mut cache = ResidualCache::new(&problem, 0.1);
        let x = [1.5, 1.0];
        // inequality: 1.5 + 1.0 - 2 = 0.5 residual => -0.5 in >= 0 form
        assert!((cache.value(&problem, &x, 0) + 0.5).abs() < 1e-12);
        // h = 0.5: lower pair -h - tol = -0.6 => 0.6, upper h - tol = 0.4 => -0.4
        assert!((cache.value(&problem, &x, 1) - 0.6).abs() < 1e-12);
        assert!((cache.value(&problem, &x, 2) + 0.4).abs() < 1e-12);
    }

    /// Paraboloid with its own band on the equality and a slow objective.
    struct Sluggish {
        delay: Duration,
    }

    impl NlpProblem for Sluggish {
        fn dimension(&self) -> usize {
            2
        }
        fn objective(&self, x: &[f64]) -> f64 {
            std::thread::sleep(self.delay);
            Paraboloid { with_equality: true }.objective(x)
        }
        fn inequality_count(&self) -> usize {
            1
        }
        fn inequalities(&self, x: &[f64], out: &mut [f64]) -> Result<(), LayoutError> {
            Paraboloid { with_equality: true }.inequalities(x, out)
        }
        fn equality_count(&self) -> usize {
            1
        }
        fn equalities(&self, x: &[f64], out: &mut [f64]) -> Result<(), LayoutError> {
            Paraboloid { with_equality: true }.equalities(x, out)
        }
        fn equality_tolerance(&self, _index: usize) -> Option<f64> {
            Some(0.25)
        }
        fn bounds(&self) -> Vec<(f64, f64)> {
            vec![(f64::NEG_INFINITY, 3.0), (-1.0, f64::INFINITY)]
        }
    }

    #[test]
    fn problem_tolerance_overrides_default_band() {
        let problem = Sluggish { delay: Duration::ZERO };
        let mut cache = ResidualCache::new(&problem, 0.1);
        // h = 0.5, tol = 0.25: upper pair h - tol = 0.25 => -0.25
        assert!((cache.value(&problem, &[1.5, 1.0], 2) + 0.25).abs() < 1e-12);
    }

    #[test]
    fn non_finite_residuals_read_as_violated() {
        struct Blowup;
        impl NlpProblem for Blowup {
            fn dimension(&self) -> usize {
                1
            }
            fn objective(&self, _x: &[f64]) -> f64 {
                f64::NAN
            }
            fn inequality_count(&self) -> usize {
                1
            }
            fn inequalities(&self, _x: &[f64], out: &mut [f64]) -> Result<(), LayoutError> {
                out[0] = f64::NAN;
                Ok(())
            }
        }
        let mut cache = ResidualCache::new(&Blowup, 0.1);
        assert_eq!(cache.value(&Blowup, &[0.0], 0), -NON_FINITE_VALUE);
    }

    #[test]
    fn open_bounds_become_finite() {
        let b = finite_bounds(&Sluggish { delay: Duration::ZERO }.bounds());
        assert_eq!(b, vec![(-OPEN_BOUND, 3.0), (-1.0, OPEN_BOUND)]);
    }

    #[test]
    fn first_chunk_is_the_floor() {
        let clock = ChunkClock::new(80);
        assert_eq!(clock.floor(), 82);
        assert_eq!(clock.chunk_for(Duration::from_secs(10)), Some(82));
    }

    #[test]
    fn chunks_shrink_with_time_left() {
        let mut clock = ChunkClock::new(2);
        // 3 simplex evaluations plus 10 steps in 130 ms: setup <= 130 ms, 13 ms a step
        clock.record(13, Duration::from_millis(130));
        assert_eq!(clock.chunk_for(Duration::from_millis(300)), Some(3 + 13));
        assert_eq!(clock.chunk_for(Duration::from_millis(140)), None);
        assert_eq!(clock.chunk_for(Duration::from_millis(100)), None);
    }

    #[test]
    fn slow_evaluations_stop_on_time() {
        let mut s = solver(100_000);
        s.criteria.max_time = Duration::from_millis(50);
        let sol = s
            .solve(&Sluggish { delay: Duration::from_millis(5) }, &[0.0, 0.0])
            .unwrap();
        assert_eq!(sol.termination, Termination::MaxTime);
        assert!(sol.elapsed < Duration::from_millis(150), "took {:?}", sol.elapsed);
        assert!(sol.evaluations > 0);
    }
}
