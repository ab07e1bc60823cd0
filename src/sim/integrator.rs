use crate::dynamics::{self, GliderState, Knot};
use crate::vehicle::PhysicalParameters;

// ---------------------------------------------------------------------------
// Classical 4th-order Runge-Kutta, elevator rate held over the step
// ---------------------------------------------------------------------------

/// Single RK4 step with constant elevator rate over the step.
pub fn rk4_step(
    state: &GliderState,
    phidot: f64,
    params: &PhysicalParameters,
    dt: f64,
) -> GliderState {
    let k1 = dynamics::derivatives(state, phidot, params).to_vector();
    let k2 = dynamics::derivatives(
        &GliderState::from_vector(&(state.to_vector() + k1 * (dt * 0.5))),
        phidot,
        params,
    )
    .to_vector();
    let k3 = dynamics::derivatives(
        &GliderState::from_vector(&(state.to_vector() + k2 * (dt * 0.5))),
        phidot,
        params,
    )
    .to_vector();
    let k4 = dynamics::derivatives(
        &GliderState::from_vector(&(state.to_vector() + k3 * dt)),
        phidot,
        params,
    )
    .to_vector();

    GliderState::from_vector(&(state.to_vector() + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)))
}

/// Forward-Euler step, the cheapest consistent propagation.
pub fn euler_step(
    state: &GliderState,
    phidot: f64,
    params: &PhysicalParameters,
    dt: f64,
) -> GliderState {
    state.apply(&dynamics::derivatives(state, phidot, params), dt)
}

// ---------------------------------------------------------------------------
// Open-loop rollout
// ---------------------------------------------------------------------------

/// Integrate an elevator-rate schedule from `initial`, one RK4 step of
/// `params.timestep` per command. Returns one knot per command, knot `i`
/// holding the state reached after `i` steps and command `i`.
pub fn rollout(initial: &GliderState, controls: &[f64], params: &PhysicalParameters) -> Vec<Knot> {
    let mut knots = Vec::with_capacity(controls.len());
    let mut state = *initial;
    for &phidot in controls {
        knots.push(Knot::new(state, phidot));
        state = rk4_step(&state, phidot, params, params.timestep);
    }
    knots
}
