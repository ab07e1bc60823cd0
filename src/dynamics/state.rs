use nalgebra::{SVector, Vector2};

// ---------------------------------------------------------------------------
// Dimensions
// ---------------------------------------------------------------------------

pub const STATE_DIM: usize = 7;
pub const CONTROL_DIM: usize = 1;
/// Scalars per knot in the flattened decision vector.
pub const KNOT_DIM: usize = STATE_DIM + CONTROL_DIM;

pub type StateVector = SVector<f64, STATE_DIM>;

// ---------------------------------------------------------------------------
// Glider state: position, attitude, elevator angle, rates
// ---------------------------------------------------------------------------

/// Planar glider state at a single instant.
/// Frame: x forward, z up, pitch positive nose-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GliderState {
    pub x: f64,        // m
    pub z: f64,        // m
    pub theta: f64,    // rad, pitch
    pub phi: f64,      // rad, elevator deflection relative to the wing
    pub xdot: f64,     // m/s
    pub zdot: f64,     // m/s
    pub thetadot: f64, // rad/s
}

impl GliderState {
    pub fn from_vector(v: &StateVector) -> Self {
        Self {
            x: v[0],
            z: v[1],
            theta: v[2],
            phi: v[3],
            xdot: v[4],
            zdot: v[5],
            thetadot: v[6],
        }
    }

    pub fn to_vector(&self) -> StateVector {
        StateVector::from([
            self.x,
            self.z,
            self.theta,
            self.phi,
            self.xdot,
            self.zdot,
            self.thetadot,
        ])
    }

    /// Advance state by a derivative scaled by dt (used inside RK4).
    pub fn apply(&self, d: &StateDerivative, dt: f64) -> GliderState {
        GliderState {
            x: self.x + d.xdot * dt,
            z: self.z + d.zdot * dt,
            theta: self.theta + d.thetadot * dt,
            phi: self.phi + d.phidot * dt,
            xdot: self.xdot + d.xddot * dt,
            zdot: self.zdot + d.zddot * dt,
            thetadot: self.thetadot + d.thetaddot * dt,
        }
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.z)
    }

    pub fn velocity(&self) -> Vector2<f64> {
        Vector2::new(self.xdot, self.zdot)
    }
}

// ---------------------------------------------------------------------------
// State derivative
// ---------------------------------------------------------------------------

/// Time derivative of [`GliderState`], ordered
/// `[xdot, zdot, thetadot, phidot, xddot, zddot, thetaddot]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateDerivative {
    pub xdot: f64,
    pub zdot: f64,
    pub thetadot: f64,
    pub phidot: f64,    // the control input, passed straight through
    pub xddot: f64,
    pub zddot: f64,
    pub thetaddot: f64,
}

impl StateDerivative {
    pub fn to_vector(&self) -> StateVector {
        StateVector::from([
            self.xdot,
            self.zdot,
            self.thetadot,
            self.phidot,
            self.xddot,
            self.zddot,
            self.thetaddot,
        ])
    }

    pub fn is_finite(&self) -> bool {
        self.to_vector().iter().all(|v| v.is_finite())
    }
}

// ---------------------------------------------------------------------------
// Knot: one (state, control) sample of the trajectory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Knot {
    pub state: GliderState,
    pub phidot: f64, // rad/s, elevator rate command
}

impl Knot {
    pub fn new(state: GliderState, phidot: f64) -> Self {
        Self { state, phidot }
    }

    /// Read a knot from an 8-wide chunk of the decision vector.
    ///
    /// Panics if `chunk` is shorter than [`KNOT_DIM`]; callers slice with
    /// `chunks_exact(KNOT_DIM)`.
    pub fn from_slice(chunk: &[f64]) -> Self {
        Self {
            state: GliderState {
                x: chunk[0],
                z: chunk[1],
                theta: chunk[2],
                phi: chunk[3],
                xdot: chunk[4],
                zdot: chunk[5],
                thetadot: chunk[6],
            },
            phidot: chunk[7],
        }
    }

    pub fn to_array(&self) -> [f64; KNOT_DIM] {
        let s = &self.state;
        [s.x, s.z, s.theta, s.phi, s.xdot, s.zdot, s.thetadot, self.phidot]
    }
}
