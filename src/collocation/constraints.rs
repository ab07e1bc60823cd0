//! Trapezoidal collocation constraints.
//!
//! Residual convention: a point is feasible when every residual is `<= 0`.
//! An equality `q = t` held within `tol` becomes the pair
//! `(-q + t - tol, q - t - tol)`; a box `|q| <= b` becomes `(-q - b, q - b)`.

use nalgebra::Vector2;

use super::layout::{
    self, anchor_offset, box_offset, check_buffer, defect_offset, knot_count, DEFECT_RESIDUALS,
};
use crate::dynamics::{self, Knot, StateVector, KNOT_DIM};
use crate::error::LayoutError;
use crate::vehicle::{BoundarySpec, PhysicalParameters, StateLimits};

/// Bound on positions when variable bounds are handed to the solver.
pub const POSITION_BOUND: f64 = 1e8;

// ---------------------------------------------------------------------------
// Residual kernels
// ---------------------------------------------------------------------------

/// `-bound <= value <= bound` as two residuals at `out[offset..offset + 2]`.
pub fn bounded_pair(out: &mut [f64], offset: usize, value: f64, bound: f64) {
    out[offset] = -value - bound;
    out[offset + 1] = value - bound;
}

/// `|value - target| <= tol` as two residuals at `out[offset..offset + 2]`.
pub fn tolerance_pair(out: &mut [f64], offset: usize, value: f64, target: f64, tol: f64) {
    out[offset] = -value + target - tol;
    out[offset + 1] = value - target - tol;
}

/// Trapezoidal defect between consecutive knots:
/// `x_k - x_k1 + h/2 (f_k + f_k1)`.
fn defect_from(
    current: &Knot,
    next: &Knot,
    f_k: &StateVector,
    f_k1: &StateVector,
    h: f64,
) -> StateVector {
    current.state.to_vector() - next.state.to_vector() + (f_k + f_k1) * (h / 2.0)
}

/// Twelve box residuals for one knot, starting at `offset`.
pub fn write_box(out: &mut [f64], offset: usize, knot: &Knot, limits: &StateLimits) {
    let s = &knot.state;
    bounded_pair(out, offset, s.theta, limits.theta);
    bounded_pair(out, offset + 2, s.phi, limits.phi);
    bounded_pair(out, offset + 4, s.xdot, limits.velocity);
    bounded_pair(out, offset + 6, s.zdot, limits.velocity);
    bounded_pair(out, offset + 8, s.thetadot, limits.thetadot);
    bounded_pair(out, offset + 10, knot.phidot, limits.phidot);
}

/// Dynamics at every knot, each evaluated once.
fn knot_derivatives(knots: &[Knot], params: &PhysicalParameters) -> Vec<StateVector> {
    knots
        .iter()
        .map(|k| dynamics::derivatives(&k.state, k.phidot, params).to_vector())
        .collect()
}

// ---------------------------------------------------------------------------
// Inequality-pair transcription (4 + 26 N residuals)
// ---------------------------------------------------------------------------

/// Fill `out` with the full inequality-pair residual vector.
///
/// Knot `i` with a successor owns 14 defect residuals and 12 box residuals
/// at offset `26 i`. The last knot keeps the same stride; its defect slots
/// are reserved and written as `0.0`. The four anchor residuals follow the
/// knot blocks.
pub fn write_inequalities(
    decision: &[f64],
    params: &PhysicalParameters,
    boundary: &BoundarySpec,
    out: &mut [f64],
) -> Result<(), LayoutError> {
    let n = knot_count(decision.len())?;
    check_buffer("residual", layout::inequality_count(n), out)?;

    let knots: Vec<Knot> = layout::knots(decision).collect();
    let derivs = knot_derivatives(&knots, params);
    let tol = boundary.defect_tolerance;

    for i in 0..n {
        let base = defect_offset(i);
        if i + 1 < n {
            let defect = defect_from(
                &knots[i],
                &knots[i + 1],
                &derivs[i],
                &derivs[i + 1],
                params.timestep,
            );
            for (j, d) in defect.iter().enumerate() {
                bounded_pair(out, base + 2 * j, *d, tol);
            }
        } else {
            out[base..base + DEFECT_RESIDUALS].fill(0.0);
        }
        write_box(out, box_offset(i), &knots[i], &boundary.limits);
    }

    write_anchor_pairs(decision, boundary, out, anchor_offset(n));
    Ok(())
}

/// Allocate and fill the inequality-pair residual vector.
pub fn inequality_residuals(
    decision: &[f64],
    params: &PhysicalParameters,
    boundary: &BoundarySpec,
) -> Result<Vec<f64>, LayoutError> {
    let n = knot_count(decision.len())?;
    let mut out = vec![0.0; layout::inequality_count(n)];
    write_inequalities(decision, params, boundary, &mut out)?;
    Ok(out)
}

fn write_anchor_pairs(decision: &[f64], boundary: &BoundarySpec, out: &mut [f64], offset: usize) {
    let anchor = boundary.anchor();
    let start = start_position(decision).unwrap_or(anchor);
    let tol = boundary.anchor_tolerance;
    tolerance_pair(out, offset, start.x, anchor.x, tol);
    tolerance_pair(out, offset + 2, start.y, anchor.y, tol);
}

fn start_position(decision: &[f64]) -> Option<Vector2<f64>> {
    layout::knots(decision).next().map(|k| k.state.position())
}

// ---------------------------------------------------------------------------
// Native-equality transcription
// ---------------------------------------------------------------------------

/// Fill `out` with defect equalities (7 per knot pair, knot-major) followed
/// by the two start anchors `x_0 - x_target`, `z_0 - z_target`.
pub fn write_equalities(
    decision: &[f64],
    params: &PhysicalParameters,
    boundary: &BoundarySpec,
    out: &mut [f64],
) -> Result<(), LayoutError> {
    let n = knot_count(decision.len())?;
    check_buffer("equality", layout::equality_count(n), out)?;

    let knots: Vec<Knot> = layout::knots(decision).collect();
    let derivs = knot_derivatives(&knots, params);
    for i in 0..n.saturating_sub(1) {
        let defect = defect_from(
            &knots[i],
            &knots[i + 1],
            &derivs[i],
            &derivs[i + 1],
            params.timestep,
        );
        out[i * defect.len()..(i + 1) * defect.len()].copy_from_slice(defect.as_slice());
    }

    let anchor = boundary.anchor();
    let start = start_position(decision).unwrap_or(anchor);
    let tail = out.len() - layout::ANCHOR_EQUALITIES;
    out[tail] = start.x - anchor.x;
    out[tail + 1] = start.y - anchor.y;
    Ok(())
}

/// Fill `out` with the 12 box residuals of every knot, packed densely.
pub fn write_box_inequalities(
    decision: &[f64],
    boundary: &BoundarySpec,
    out: &mut [f64],
) -> Result<(), LayoutError> {
    let n = knot_count(decision.len())?;
    check_buffer("box", layout::box_inequality_count(n), out)?;
    for (i, knot) in layout::knots(decision).enumerate() {
        write_box(out, i * layout::BOX_RESIDUALS, &knot, &boundary.limits);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Per-variable bounds
// ---------------------------------------------------------------------------

/// Native box bounds for every decision variable: positions are effectively
/// free, every other component is held to its boundary limit.
pub fn variable_bounds(knots: usize, limits: &StateLimits) -> Vec<(f64, f64)> {
    let per_knot: [f64; KNOT_DIM] = [
        POSITION_BOUND,
        POSITION_BOUND,
        limits.theta,
        limits.phi,
        limits.velocity,
        limits.velocity,
        limits.thetadot,
        limits.phidot,
    ];
    (0..knots)
        .flat_map(|_| per_knot.iter().map(|b| (-b, *b)))
        .collect()
}
