//! Decision-vector and residual layout.
//!
//! Every size and offset used by the constraint builders, the NLP problem
//! and the driver comes from here.
//!
//! ```text
//! decision vector:  [ knot 0 (8) | knot 1 (8) | ... | knot N-1 (8) ]
//! residuals:        [ knot 0 (26) | ... | knot N-1 (26) | anchors (4) ]
//! knot block:       [ defect pairs (14) | box pairs (12) ]
//! ```

use crate::dynamics::state::{Knot, KNOT_DIM, STATE_DIM};
use crate::error::LayoutError;

/// Two residuals per state component of the trapezoidal defect.
pub const DEFECT_RESIDUALS: usize = 2 * STATE_DIM;
/// Pairs for theta, phi, vx, vz, thetadot, phidot.
pub const BOX_RESIDUALS: usize = 12;
pub const KNOT_STRIDE: usize = DEFECT_RESIDUALS + BOX_RESIDUALS;
/// Pairs anchoring the first knot's x and z.
pub const ANCHOR_RESIDUALS: usize = 4;
pub const ANCHOR_EQUALITIES: usize = 2;

/// Number of knots in a decision vector, or an error if the length is not a
/// whole number of knots. An empty vector has zero knots.
pub fn knot_count(len: usize) -> Result<usize, LayoutError> {
    if len % KNOT_DIM != 0 {
        return Err(LayoutError::Misaligned { len });
    }
    Ok(len / KNOT_DIM)
}

pub const fn dimension(knots: usize) -> usize {
    KNOT_DIM * knots
}

/// Residual count of the inequality-pair transcription: `4 + 26 N`.
pub const fn inequality_count(knots: usize) -> usize {
    ANCHOR_RESIDUALS + KNOT_STRIDE * knots
}

/// Equalities of the native-equality transcription: one per defect
/// component of every knot pair, plus the two start anchors.
pub const fn equality_count(knots: usize) -> usize {
    STATE_DIM * knots.saturating_sub(1) + ANCHOR_EQUALITIES
}

/// Box-only inequalities of the native-equality transcription.
pub const fn box_inequality_count(knots: usize) -> usize {
    BOX_RESIDUALS * knots
}

pub const fn defect_offset(knot: usize) -> usize {
    KNOT_STRIDE * knot
}

pub const fn box_offset(knot: usize) -> usize {
    KNOT_STRIDE * knot + DEFECT_RESIDUALS
}

pub const fn anchor_offset(knots: usize) -> usize {
    KNOT_STRIDE * knots
}

/// Knots of a decision vector. A trailing partial knot is ignored; callers
/// check alignment with [`knot_count`] first.
pub fn knots(decision: &[f64]) -> impl Iterator<Item = Knot> + '_ {
    decision.chunks_exact(KNOT_DIM).map(Knot::from_slice)
}

/// Flatten knots back into a decision vector.
pub fn flatten(knots: &[Knot]) -> Vec<f64> {
    knots.iter().flat_map(|k| k.to_array()).collect()
}

pub(crate) fn check_buffer(
    what: &'static str,
    expected: usize,
    buffer: &[f64],
) -> Result<(), LayoutError> {
    if buffer.len() != expected {
        return Err(LayoutError::BufferSize {
            what,
            expected,
            got: buffer.len(),
        });
    }
    Ok(())
}
