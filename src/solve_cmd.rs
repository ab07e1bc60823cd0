//! Solve command: straight-glide guess in, optimized perch out.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use nalgebra::Vector2;
use tracing::{info, info_span, warn};

use perch_glider::guess;
use perch_glider::io::{csv, json};
use perch_glider::vehicle::StateWeight;
use perch_glider::{SolverConfig, TrajectoryOptimizer};

use crate::cli::SolveArgs;

pub fn run(args: SolveArgs) -> Result<()> {
    let _cmd = info_span!("solve").entered();
    if !(args.max_time.is_finite() && args.max_time >= 0.0) {
        bail!("--max-time must be a non-negative number of seconds, got {}", args.max_time);
    }

    let mut config = SolverConfig::default()
        .backend(args.backend)
        .formulation(args.formulation)
        .max_evaluations(args.max_evals)
        .max_time(Duration::from_secs_f64(args.max_time));
    config.bound_variables = !args.free_variables;

    // 1. Parameters
    let mut optimizer = TrajectoryOptimizer::new(config);
    optimizer
        .load_parameters(
            &args.params,
            args.duration,
            args.knots,
            StateWeight::identity() * args.state_weight,
            args.control_weight,
            vec![args.start[0]],
            vec![args.start[1]],
        )
        .with_context(|| format!("failed to load parameters: {}", args.params.display()))?;

    // 2. Initial guess
    let start = Vector2::new(args.start[0], args.start[1]);
    let end = Vector2::new(args.end[0], args.end[1]);
    let initial = guess::straight_line(start, end, args.knots, args.duration)
        .context("failed to build initial guess")?;
    optimizer.load_initial_guess(initial)?;

    // 3. Optimize
    let outcome = optimizer.optimize().context("trajectory optimization failed")?;
    if !outcome.is_feasible() {
        warn!(
            max_violation = outcome.constraints.max_violation,
            "best trajectory is not feasible"
        );
    }

    // 4. Outputs
    let timestep = args.duration / args.knots as f64;
    if let Some(path) = &args.csv {
        csv::write_trajectory_file(path, &outcome.trajectory, timestep)
            .with_context(|| format!("failed to write CSV: {}", path.display()))?;
        info!(path = %path.display(), "trajectory written");
    }
    if let Some(path) = &args.summary {
        json::write_summary_file(path, &outcome)
            .with_context(|| format!("failed to write summary: {}", path.display()))?;
        info!(path = %path.display(), "summary written");
    }

    let stdout = std::io::stdout();
    csv::write_trajectory(&mut stdout.lock(), &outcome.trajectory, timestep)?;
    println!(
        "# cost {:.6}, {} evaluations, {}, max violation {:.3e}",
        outcome.objective,
        outcome.evaluations,
        outcome.termination.as_str(),
        outcome.constraints.max_violation,
    );
    Ok(())
}
