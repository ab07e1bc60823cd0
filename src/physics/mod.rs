pub mod aerodynamics;

pub use aerodynamics::{
    cross2, drag_coefficient, flow_angle, lift_coefficient, plate_force, plate_normal,
};
