use std::time::Duration;

use serde::Serialize;

use crate::collocation::{layout, ConstraintReport};
use crate::dynamics::{GliderState, Knot};
use crate::error::LayoutError;
use crate::nlp::Termination;

/// Optimized trajectory as six per-knot sequences of equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrajectoryResult {
    pub x: Vec<f64>,     // m
    pub z: Vec<f64>,     // m
    pub theta: Vec<f64>, // rad
    pub phi: Vec<f64>,   // rad
    pub vx: Vec<f64>,    // m/s
    pub vz: Vec<f64>,    // m/s
}

impl TrajectoryResult {
    pub fn from_decision_vector(decision: &[f64]) -> Result<Self, LayoutError> {
        let n = layout::knot_count(decision.len())?;
        let mut out = TrajectoryResult {
            x: Vec::with_capacity(n),
            z: Vec::with_capacity(n),
            theta: Vec::with_capacity(n),
            phi: Vec::with_capacity(n),
            vx: Vec::with_capacity(n),
            vz: Vec::with_capacity(n),
        };
        for knot in layout::knots(decision) {
            let s = knot.state;
            out.x.push(s.x);
            out.z.push(s.z);
            out.theta.push(s.theta);
            out.phi.push(s.phi);
            out.vx.push(s.xdot);
            out.vz.push(s.zdot);
        }
        Ok(out)
    }

    /// Re-pack into a decision vector. The result drops the pitch rate and
    /// elevator rate, so they are supplied per knot.
    pub fn to_decision_vector(
        &self,
        thetadot: &[f64],
        phidot: &[f64],
    ) -> Result<Vec<f64>, LayoutError> {
        let n = self.len();
        for (what, got) in [
            ("z", self.z.len()),
            ("theta", self.theta.len()),
            ("phi", self.phi.len()),
            ("vx", self.vx.len()),
            ("vz", self.vz.len()),
            ("thetadot", thetadot.len()),
            ("phidot", phidot.len()),
        ] {
            if got != n {
                return Err(LayoutError::BufferSize {
                    what,
                    expected: n,
                    got,
                });
            }
        }
        let knots: Vec<Knot> = (0..n)
            .map(|i| {
                Knot::new(
                    GliderState {
                        x: self.x[i],
                        z: self.z[i],
                        theta: self.theta[i],
                        phi: self.phi[i],
                        xdot: self.vx[i],
                        zdot: self.vz[i],
                        thetadot: thetadot[i],
                    },
                    phidot[i],
                )
            })
            .collect();
        Ok(layout::flatten(&knots))
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Everything a solve hands back: the trajectory plus how the search ended.
#[derive(Debug, Clone, Default)]
pub struct SolveOutcome {
    pub trajectory: TrajectoryResult,
    pub objective: f64,
    pub evaluations: usize,
    pub termination: Termination,
    pub elapsed: Duration,
    /// Inequality-pair residuals of the returned point.
    pub constraints: ConstraintReport,
}

impl SolveOutcome {
    pub fn is_feasible(&self) -> bool {
        self.constraints.is_feasible()
    }
}
