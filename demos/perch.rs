use std::path::Path;
use std::time::Duration;

use nalgebra::Vector2;

use perch_glider::guess;
use perch_glider::io::{csv, json};
use perch_glider::vehicle::{BoundarySpec, PhysicalParameters, StateLimits};
use perch_glider::{SolverConfig, TrajectoryOptimizer};

const KNOTS: usize = 10;
const DURATION: f64 = 1.0; // s

fn main() {
    let limits = StateLimits {
        theta: 1.0,
        phi: 1.0,
        velocity: 5.0,
        thetadot: 5.0,
        phidot: 5.0,
    };
    let config = SolverConfig::default().max_time(Duration::from_millis(500));
    let mut optimizer = TrajectoryOptimizer::new(config);
    optimizer
        .set_parameters(
            PhysicalParameters::builder().duration(DURATION, KNOTS).build(),
            BoundarySpec::anchored_at(limits, 0.0, 1.0),
        )
        .expect("Invalid glider parameters");

    let start = Vector2::new(0.0, 1.0);
    let end = Vector2::new(1.0, 0.0);
    let initial =
        guess::straight_line(start, end, KNOTS, DURATION).expect("Failed to build initial guess");
    optimizer.load_initial_guess(initial).expect("Misaligned guess");

    println!("Optimizing {KNOTS}-knot perch from (0, 1) m ...");
    let outcome = optimizer.optimize().expect("Optimization failed");
    println!("Cost: {:.4}", outcome.objective);
    println!(
        "Evaluations: {} ({}) in {:.0} ms",
        outcome.evaluations,
        outcome.termination.as_str(),
        outcome.elapsed.as_secs_f64() * 1000.0
    );
    println!(
        "Feasible: {} (max violation {:.2e})",
        outcome.is_feasible(),
        outcome.constraints.max_violation
    );

    let timestep = DURATION / KNOTS as f64;
    csv::write_trajectory_file(Path::new("perch_trajectory.csv"), &outcome.trajectory, timestep)
        .expect("Failed to write CSV");
    json::write_summary_file(Path::new("perch_summary.json"), &outcome)
        .expect("Failed to write JSON");

    println!("Exported: perch_trajectory.csv, perch_summary.json");
}
