use nalgebra::Vector2;

use crate::dynamics::state::{GliderState, StateDerivative};
use crate::physics::aerodynamics::{cross2, flow_angle, plate_force, plate_normal};
use crate::vehicle::PhysicalParameters;

// ---------------------------------------------------------------------------
// Per-surface kinematics and loads
// ---------------------------------------------------------------------------

/// Kinematics and aerodynamic load of one lifting plate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceState {
    pub position: Vector2<f64>, // m, plate centroid
    pub velocity: Vector2<f64>, // m/s, plate centroid
    pub normal: Vector2<f64>,
    pub alpha: f64,             // rad, angle of attack
    pub force: Vector2<f64>,    // N
}

/// Wing plate, rigidly attached `wing_arm` behind the CG.
pub fn wing_surface(state: &GliderState, params: &PhysicalParameters) -> SurfaceState {
    let (sin_t, cos_t) = state.theta.sin_cos();
    let l_w = params.wing_arm;

    let chord = Vector2::new(cos_t, sin_t);
    let position = state.position() - chord * l_w;
    let velocity = state.velocity() + Vector2::new(sin_t, -cos_t) * (l_w * state.thetadot);
    surface(
        position,
        velocity,
        state.theta,
        params.wing_area,
        params.aero.air_density,
    )
}

/// Elevator plate, hinged at `pivot_arm` behind the CG and deflected by phi.
pub fn elevator_surface(
    state: &GliderState,
    phidot: f64,
    params: &PhysicalParameters,
) -> SurfaceState {
    let (sin_t, cos_t) = state.theta.sin_cos();
    let deflected = state.theta + state.phi;
    let (sin_e, cos_e) = deflected.sin_cos();
    let l = params.pivot_arm;
    let l_e = params.elevator_arm;
    let rate_e = state.thetadot + phidot;

    let position =
        state.position() - Vector2::new(cos_t, sin_t) * l - Vector2::new(cos_e, sin_e) * l_e;
    let velocity = state.velocity()
        + Vector2::new(sin_t, -cos_t) * (l * state.thetadot)
        + Vector2::new(sin_e, -cos_e) * (l_e * rate_e);
    surface(
        position,
        velocity,
        deflected,
        params.elevator_area,
        params.aero.air_density,
    )
}

fn surface(
    position: Vector2<f64>,
    velocity: Vector2<f64>,
    chord_angle: f64,
    area: f64,
    density: f64,
) -> SurfaceState {
    let normal = plate_normal(chord_angle);
    let alpha = chord_angle - flow_angle(&velocity);
    let force = plate_force(&velocity, alpha, area, &normal, density);
    SurfaceState {
        position,
        velocity,
        normal,
        alpha,
        force,
    }
}

// ---------------------------------------------------------------------------
// Equations of motion (planar, two flat plates)
// ---------------------------------------------------------------------------

/// Compute the state derivative for a given state and elevator rate.
///
/// Forces modeled:
///   1. Wing plate normal force (flat-plate Cl + Cd)
///   2. Elevator plate normal force
///   3. Weight
///
/// Pitch moment is the 2D cross product of each plate's moment arm with its
/// force, divided by the pitch inertia. The elevator rate is a direct control
/// and passes through as `phidot`.
pub fn derivatives(
    state: &GliderState,
    phidot: f64,
    params: &PhysicalParameters,
) -> StateDerivative {
    let wing = wing_surface(state, params);
    let elevator = elevator_surface(state, phidot, params);

    // --- Translational ---
    let weight = Vector2::new(0.0, params.weight());
    let accel = (wing.force + elevator.force - weight) / params.mass;

    // --- Rotational ---
    let (sin_t, cos_t) = state.theta.sin_cos();
    let wing_arm = Vector2::new(params.wing_arm, 0.0);
    let elevator_arm = Vector2::new(
        -params.pivot_arm - params.elevator_arm * cos_t,
        -params.pivot_arm + params.elevator_arm * sin_t,
    );
    let torque = cross2(&wing_arm, &wing.force) + cross2(&elevator_arm, &elevator.force);

    StateDerivative {
        xdot: state.xdot,
        zdot: state.zdot,
        thetadot: state.thetadot,
        phidot,
        xddot: accel.x,
        zddot: accel.y,
        thetaddot: torque / params.inertia,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
