pub mod flatness;

pub use flatness::estimated_rotation;
