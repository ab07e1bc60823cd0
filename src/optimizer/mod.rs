pub mod driver;
pub mod problem;
pub mod result;

pub use driver::{solve, Backend, SolverConfig, TrajectoryOptimizer};
pub use problem::{Formulation, GliderProblem};
pub use result::{SolveOutcome, TrajectoryResult};
