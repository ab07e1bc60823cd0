use serde::Serialize;

/// Feasibility summary of a residual vector (`<= 0` is satisfied).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConstraintReport {
    pub count: usize,
    pub violated: usize,
    /// Largest positive residual, 0 when everything is satisfied.
    pub max_violation: f64,
    pub worst_index: Option<usize>,
    /// Residuals that are NaN or infinite.
    pub non_finite: usize,
}

impl ConstraintReport {
    pub fn from_residuals(residuals: &[f64]) -> Self {
        let mut report = ConstraintReport {
            count: residuals.len(),
            ..Default::default()
        };
        for (i, &r) in residuals.iter().enumerate() {
            if !r.is_finite() {
                report.non_finite += 1;
                report.violated += 1;
                continue;
            }
            if r > 0.0 {
                report.violated += 1;
                if r > report.max_violation {
                    report.max_violation = r;
                    report.worst_index = Some(i);
                }
            }
        }
        report
    }

    pub fn is_feasible(&self) -> bool {
        self.violated == 0
    }

    /// Feasible up to `slack`: no residual above it and none non-finite.
    pub fn is_feasible_within(&self, slack: f64) -> bool {
        self.non_finite == 0 && self.max_violation <= slack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_satisfied() {
        let r = ConstraintReport::from_residuals(&[-1.0, 0.0, -0.5]);
        assert!(r.is_feasible());
        assert_eq!(r.count, 3);
        assert_eq!(r.worst_index, None);
    }

    #[test]
    fn tracks_worst_violation() {
        let r = ConstraintReport::from_residuals(&[0.1, -1.0, 0.4, 0.2]);
        assert_eq!(r.violated, 3);
        assert_eq!(r.worst_index, Some(2));
        assert!((r.max_violation - 0.4).abs() < 1e-12);
        assert!(r.is_feasible_within(0.5));
        assert!(!r.is_feasible_within(0.3));
    }

    #[test]
    fn nan_counts_as_violation() {
        let r = ConstraintReport::from_residuals(&[f64::NAN, -1.0]);
        assert!(!r.is_feasible());
        assert!(!r.is_feasible_within(1e9));
        assert_eq!(r.non_finite, 1);
    }
}
