pub mod glider;
pub mod state;

pub use glider::{derivatives, elevator_surface, wing_surface, SurfaceState};
pub use state::{GliderState, Knot, StateDerivative, StateVector, CONTROL_DIM, KNOT_DIM, STATE_DIM};
