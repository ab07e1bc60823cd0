pub mod collocation;
pub mod config;
pub mod cost;
pub mod dynamics;
pub mod error;
pub mod gnc;
pub mod guess;
pub mod io;
pub mod nlp;
pub mod optimizer;
pub mod physics;
pub mod sim;
pub mod vehicle;

pub use error::{ConfigError, GuessError, LayoutError, OptimizeError, SolveError};
pub use optimizer::{
    solve, Backend, Formulation, SolveOutcome, SolverConfig, TrajectoryOptimizer, TrajectoryResult,
};
pub use vehicle::{BoundarySpec, PhysicalParameters, StateLimits};
