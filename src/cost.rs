//! Quadratic regulator cost over the whole trajectory.
//!
//! ```text
//! J = h * sum_i (x_i' Q x_i + u_i R u_i) + 1e6 * (|x_0 - x_target| + |z_0 - z_target|)
//! ```
//!
//! The start-position penalty backs up the anchor residuals of the
//! constraint builder as a soft equality.

use crate::collocation::layout;
use crate::dynamics::Knot;
use crate::vehicle::{BoundarySpec, PhysicalParameters};

pub const ANCHOR_PENALTY_WEIGHT: f64 = 1e6;

/// `x' Q x + u R u` for one knot.
pub fn stage_cost(knot: &Knot, params: &PhysicalParameters) -> f64 {
    let s = knot.state.to_vector();
    s.dot(&(params.state_weight * s)) + knot.phidot * params.control_weight * knot.phidot
}

/// L1 distance of the first knot's position from the start target.
pub fn anchor_error(decision: &[f64], boundary: &BoundarySpec) -> f64 {
    match decision {
        [x, z, ..] => {
            let target = boundary.anchor();
            (x - target.x).abs() + (z - target.y).abs()
        }
        _ => 0.0,
    }
}

/// Scalar objective for a full decision vector. An empty vector costs 0.
pub fn objective(decision: &[f64], params: &PhysicalParameters, boundary: &BoundarySpec) -> f64 {
    let running: f64 = layout::knots(decision)
        .map(|k| stage_cost(&k, params))
        .sum();
    running * params.timestep + ANCHOR_PENALTY_WEIGHT * anchor_error(decision, boundary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::GliderState;
    use crate::vehicle::{StateLimits, StateWeight};

    fn boundary() -> BoundarySpec {
        let limits = StateLimits {
            theta: 1.0,
            phi: 1.0,
            velocity: 5.0,
            thetadot: 5.0,
            phidot: 5.0,
        };
        BoundarySpec::anchored_at(limits, 0.0, 1.0)
    }

    #[test]
    fn identity_weight_is_squared_norm() {
        let p = PhysicalParameters::builder().control_weight(2.0).build();
        let k = Knot::new(
            GliderState {
                x: 1.0,
                z: 2.0,
                ..GliderState::default()
            },
            3.0,
        );
        assert!((stage_cost(&k, &p) - (1.0 + 4.0 + 18.0)).abs() < 1e-12);
    }

    #[test]
    fn cost_scales_with_timestep() {
        let z = [0.0, 1.0, 0.2, 0.0, 1.0, 0.0, 0.0, 0.5];
        let b = boundary();
        let p1 = PhysicalParameters::builder().timestep(0.1).build();
        let p2 = PhysicalParameters::builder().timestep(0.2).build();
        let j1 = objective(&z, &p1, &b);
        let j2 = objective(&z, &p2, &b);
        assert!((j2 - 2.0 * j1).abs() < 1e-12);
    }

    #[test]
    fn start_offset_is_heavily_penalized() {
        let p = PhysicalParameters::builder().build();
        let b = boundary();
        let on = [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let off = [0.001, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let delta = objective(&off, &p, &b) - objective(&on, &p, &b);
        assert!((delta - 1000.0).abs() < 1e-3, "delta = {delta}");
    }

    #[test]
    fn off_diagonal_weight_couples_components() {
        let mut q = StateWeight::identity();
        q[(0, 1)] = 0.5;
        q[(1, 0)] = 0.5;
        let p = PhysicalParameters::builder().state_weight(q).build();
        let k = Knot::new(
            GliderState {
                x: 1.0,
                z: 1.0,
                ..GliderState::default()
            },
            0.0,
        );
        assert!((stage_cost(&k, &p) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_decision_costs_nothing() {
        let p = PhysicalParameters::builder().build();
        assert_eq!(objective(&[], &p, &boundary()), 0.0);
    }
}
