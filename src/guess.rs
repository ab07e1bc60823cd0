//! Initial guesses for the collocation decision vector.

use nalgebra::Vector2;

use crate::collocation::layout;
use crate::dynamics::{GliderState, Knot};
use crate::error::GuessError;
use crate::sim;
use crate::vehicle::PhysicalParameters;

/// Straight glide from `start` to `end` over `duration` seconds.
///
/// Positions are evenly spaced over the knots, velocity is constant, pitch,
/// elevator and rates are zero. A single knot sits at `start`.
pub fn straight_line(
    start: Vector2<f64>,
    end: Vector2<f64>,
    knots: usize,
    duration: f64,
) -> Result<Vec<f64>, GuessError> {
    if knots == 0 {
        return Err(GuessError::NoKnots);
    }
    if !duration.is_finite() || duration <= 0.0 {
        return Err(GuessError::NonPositiveDuration(duration));
    }
    let velocity = (end - start) / duration;
    let span = (knots - 1).max(1) as f64;
    let path: Vec<Knot> = (0..knots)
        .map(|i| {
            let p = start + (end - start) * (i as f64 / span);
            Knot::new(
                GliderState {
                    x: p.x,
                    z: p.y,
                    xdot: velocity.x,
                    zdot: velocity.y,
                    ..GliderState::default()
                },
                0.0,
            )
        })
        .collect();
    Ok(layout::flatten(&path))
}

/// Dynamically consistent guess: integrate the elevator-rate schedule from
/// `initial` with RK4 at the parameter timestep.
pub fn rollout_guess(
    initial: &GliderState,
    controls: &[f64],
    params: &PhysicalParameters,
) -> Result<Vec<f64>, GuessError> {
    if controls.is_empty() {
        return Err(GuessError::NoKnots);
    }
    Ok(layout::flatten(&sim::rollout(initial, controls, params)))
}
