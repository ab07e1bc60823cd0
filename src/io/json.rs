use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::nlp::Termination;
use crate::optimizer::SolveOutcome;

/// Headline numbers of one solve.
#[derive(Debug, Clone, Serialize)]
pub struct SolveSummary {
    pub knots: usize,
    pub objective: f64,
    pub evaluations: usize,
    pub termination: Termination,
    pub elapsed_s: f64,
    pub violated: usize,
    pub max_violation: f64,
    pub feasible: bool,
    pub final_position: Option<[f64; 2]>, // m, (x, z) at the last knot
}

impl SolveSummary {
    pub fn from_outcome(outcome: &SolveOutcome) -> Self {
        let t = &outcome.trajectory;
        let final_position = match (t.x.last(), t.z.last()) {
            (Some(&x), Some(&z)) => Some([x, z]),
            _ => None,
        };
        SolveSummary {
            knots: t.len(),
            objective: outcome.objective,
            evaluations: outcome.evaluations,
            termination: outcome.termination,
            elapsed_s: outcome.elapsed.as_secs_f64(),
            violated: outcome.constraints.violated,
            max_violation: outcome.constraints.max_violation,
            feasible: outcome.is_feasible(),
            final_position,
        }
    }
}

/// Write the solve summary plus the trajectory as pretty JSON.
pub fn write_summary<W: Write>(writer: &mut W, outcome: &SolveOutcome) -> io::Result<()> {
    let doc = serde_json::json!({
        "summary": SolveSummary::from_outcome(outcome),
        "trajectory": &outcome.trajectory,
    });
    serde_json::to_writer_pretty(&mut *writer, &doc)?;
    writeln!(writer)
}

/// Write the solve summary JSON to a file.
pub fn write_summary_file(path: &Path, outcome: &SolveOutcome) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, outcome)
}
