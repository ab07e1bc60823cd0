pub mod integrator;

pub use integrator::{euler_step, rk4_step, rollout};
