pub mod boundary;
pub mod glider;

pub use boundary::{BoundarySpec, StateLimits, DEFAULT_TOLERANCE};
pub use glider::{
    AeroConstants, GliderBuilder, PhysicalParameters, StateWeight, AIR_DENSITY_SEA_LEVEL, GRAVITY,
};
