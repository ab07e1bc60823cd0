//! Direct-collocation transcription of the glider dynamics.

pub mod constraints;
pub mod layout;
pub mod report;

pub use constraints::{
    bounded_pair, inequality_residuals, tolerance_pair, variable_bounds, POSITION_BOUND,
    write_box_inequalities, write_equalities, write_inequalities,
};
pub use layout::{box_inequality_count, equality_count, inequality_count, knot_count};
pub use report::ConstraintReport;
