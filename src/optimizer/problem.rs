use std::fmt;
use std::str::FromStr;

use crate::collocation::{
    layout, variable_bounds, write_box_inequalities, write_equalities, write_inequalities,
};
use crate::cost;
use crate::error::LayoutError;
use crate::nlp::NlpProblem;
use crate::vehicle::{BoundarySpec, PhysicalParameters};

/// How the collocation constraints are handed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Formulation {
    /// Every equality emitted as a tolerance pair; 4 + 26N inequalities.
    #[default]
    InequalityPairs,
    /// Defects and anchors as equalities, box limits as inequalities.
    Equality,
}

impl fmt::Display for Formulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formulation::InequalityPairs => write!(f, "inequality"),
            Formulation::Equality => write!(f, "equality"),
        }
    }
}

impl FromStr for Formulation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inequality" | "pairs" => Ok(Formulation::InequalityPairs),
            "equality" => Ok(Formulation::Equality),
            other => Err(format!("unknown formulation `{other}` (inequality, equality)")),
        }
    }
}

/// Collocation transcription of one perching solve.
pub struct GliderProblem<'a> {
    params: &'a PhysicalParameters,
    boundary: &'a BoundarySpec,
    knots: usize,
    formulation: Formulation,
    bound_variables: bool,
}

impl<'a> GliderProblem<'a> {
    pub fn new(params: &'a PhysicalParameters, boundary: &'a BoundarySpec, knots: usize) -> Self {
        Self {
            params,
            boundary,
            knots,
            formulation: Formulation::default(),
            bound_variables: true,
        }
    }

    pub fn formulation(mut self, v: Formulation) -> Self { self.formulation = v; self }
    pub fn bound_variables(mut self, v: bool) -> Self { self.bound_variables = v; self }

    pub fn knots(&self) -> usize {
        self.knots
    }
}

impl NlpProblem for GliderProblem<'_> {
    fn dimension(&self) -> usize {
        layout::dimension(self.knots)
    }

    fn objective(&self, x: &[f64]) -> f64 {
        cost::objective(x, self.params, self.boundary)
    }

    fn inequality_count(&self) -> usize {
        match self.formulation {
            Formulation::InequalityPairs => layout::inequality_count(self.knots),
            Formulation::Equality => layout::box_inequality_count(self.knots),
        }
    }

    fn inequalities(&self, x: &[f64], out: &mut [f64]) -> Result<(), LayoutError> {
        match self.formulation {
            Formulation::InequalityPairs => write_inequalities(x, self.params, self.boundary, out),
            Formulation::Equality => write_box_inequalities(x, self.boundary, out),
        }
    }

    fn equality_count(&self) -> usize {
        match self.formulation {
            Formulation::InequalityPairs => 0,
            Formulation::Equality => layout::equality_count(self.knots),
        }
    }

    fn equalities(&self, x: &[f64], out: &mut [f64]) -> Result<(), LayoutError> {
        match self.formulation {
            Formulation::InequalityPairs => Ok(()),
            Formulation::Equality => write_equalities(x, self.params, self.boundary, out),
        }
    }

    /// Defect rows use the defect band, the two trailing anchor rows the
    /// anchor band, matching the inequality-pair transcription.
    fn equality_tolerance(&self, index: usize) -> Option<f64> {
        let anchors_from = self.equality_count().checked_sub(layout::ANCHOR_EQUALITIES)?;
        Some(if index >= anchors_from {
            self.boundary.anchor_tolerance
        } else {
            self.boundary.defect_tolerance
        })
    }

    fn bounds(&self) -> Vec<(f64, f64)> {
        if self.bound_variables {
            variable_bounds(self.knots, &self.boundary.limits)
        } else {
            vec![(f64::NEG_INFINITY, f64::INFINITY); self.dimension()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::StateLimits;

    fn fixture() -> (PhysicalParameters, BoundarySpec) {
        let limits = StateLimits {
            theta: 1.0,
            phi: 1.0,
            velocity: 5.0,
            thetadot: 5.0,
            phidot: 5.0,
        };
        (
            PhysicalParameters::builder().build(),
            BoundarySpec::anchored_at(limits, 0.0, 1.0),
        )
    }

    #[test]
    fn inequality_pair_sizes() {
        let (p, b) = fixture();
        let problem = GliderProblem::new(&p, &b, 5);
        assert_eq!(problem.dimension(), 40);
        assert_eq!(problem.inequality_count(), 134);
        assert_eq!(problem.equality_count(), 0);
    }

    #[test]
    fn equality_sizes() {
        let (p, b) = fixture();
        let problem = GliderProblem::new(&p, &b, 5).formulation(Formulation::Equality);
        assert_eq!(problem.inequality_count(), 60);
        assert_eq!(problem.equality_count(), 30);
        let x = vec![0.0; 40];
        let mut eq = vec![0.0; 30];
        problem.equalities(&x, &mut eq).unwrap();
        // z_0 - 1
        assert_eq!(eq[29], -1.0);
    }

    #[test]
    fn bounds_follow_flag() {
        let (p, b) = fixture();
        let open = GliderProblem::new(&p, &b, 2).bound_variables(false);
        assert!(open.bounds().iter().all(|(lo, hi)| lo.is_infinite() && hi.is_infinite()));
        let bounds = GliderProblem::new(&p, &b, 2).bounds();
        assert_eq!(bounds.len(), 16);
        assert_eq!(bounds[2], (-1.0, 1.0));
        assert_eq!(bounds[12], (-5.0, 5.0));
    }

    #[test]
    fn anchor_equalities_use_anchor_band() {
        let (p, mut b) = fixture();
        b.defect_tolerance = 0.02;
        b.anchor_tolerance = 0.005;
        let problem = GliderProblem::new(&p, &b, 5).formulation(Formulation::Equality);
        assert_eq!(problem.equality_tolerance(0), Some(0.02));
        assert_eq!(problem.equality_tolerance(27), Some(0.02));
        assert_eq!(problem.equality_tolerance(28), Some(0.005));
        assert_eq!(problem.equality_tolerance(29), Some(0.005));
        let pairs = GliderProblem::new(&p, &b, 5);
        assert_eq!(pairs.equality_tolerance(0), None);
    }

    #[test]
    fn formulation_parses() {
        assert_eq!("equality".parse::<Formulation>(), Ok(Formulation::Equality));
        assert_eq!("inequality".parse::<Formulation>(), Ok(Formulation::InequalityPairs));
        assert!("soft".parse::<Formulation>().is_err());
    }
}
