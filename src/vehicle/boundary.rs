use nalgebra::Vector2;

use crate::error::ConfigError;
use crate::vehicle::glider::{non_negative, positive};

/// Default half-width of the band used for emulated equalities.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

// ---------------------------------------------------------------------------
// Actuator and state limits
// ---------------------------------------------------------------------------

/// Symmetric limits: each bounded quantity must stay within `±limit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateLimits {
    pub theta: f64,    // rad
    pub phi: f64,      // rad
    pub velocity: f64, // m/s, applied to vx and vz independently
    pub thetadot: f64, // rad/s
    pub phidot: f64,   // rad/s
}

impl StateLimits {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("theta_contrain", self.theta)?;
        positive("phi_contrain", self.phi)?;
        positive("velocity_constrain", self.velocity)?;
        positive("thetadot_constrain", self.thetadot)?;
        positive("phidot_constrain", self.phidot)
    }
}

// ---------------------------------------------------------------------------
// Boundary specification
// ---------------------------------------------------------------------------

/// Limits and endpoint targets defining feasibility for one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundarySpec {
    pub limits: StateLimits,
    /// Per-knot horizontal position targets. Only index 0 anchors the solve.
    pub initial_x: Vec<f64>,
    /// Per-knot vertical position targets. Only index 0 anchors the solve.
    pub initial_z: Vec<f64>,
    pub defect_tolerance: f64,
    pub anchor_tolerance: f64,
}

impl BoundarySpec {
    pub fn new(limits: StateLimits, initial_x: Vec<f64>, initial_z: Vec<f64>) -> Self {
        Self {
            limits,
            initial_x,
            initial_z,
            defect_tolerance: DEFAULT_TOLERANCE,
            anchor_tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Boundary with a single start-position target.
    pub fn anchored_at(limits: StateLimits, x: f64, z: f64) -> Self {
        Self::new(limits, vec![x], vec![z])
    }

    /// Target for the first knot's position. Empty sequences anchor to the
    /// origin; [`BoundarySpec::validate`] rejects them before a solve.
    pub fn anchor(&self) -> Vector2<f64> {
        Vector2::new(
            self.initial_x.first().copied().unwrap_or(0.0),
            self.initial_z.first().copied().unwrap_or(0.0),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        if self.initial_x.is_empty() {
            return Err(ConfigError::invalid("initial_x", "needs at least one target"));
        }
        if self.initial_z.is_empty() {
            return Err(ConfigError::invalid("initial_z", "needs at least one target"));
        }
        if !self.anchor().iter().all(|v| v.is_finite()) {
            return Err(ConfigError::invalid("initial position", "must be finite"));
        }
        non_negative("defect_tolerance", self.defect_tolerance)?;
        non_negative("anchor_tolerance", self.anchor_tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> StateLimits {
        StateLimits {
            theta: 1.0,
            phi: 1.0,
            velocity: 5.0,
            thetadot: 5.0,
            phidot: 5.0,
        }
    }

    #[test]
    fn anchor_uses_first_target_only() {
        let b = BoundarySpec::new(limits(), vec![0.0, 0.5, 1.0], vec![1.0, 0.5, 0.0]);
        assert_eq!(b.anchor(), Vector2::new(0.0, 1.0));
    }

    #[test]
    fn empty_targets_rejected() {
        let b = BoundarySpec::new(limits(), vec![], vec![1.0]);
        assert!(b.validate().is_err());
    }

    #[test]
    fn zero_limit_rejected() {
        let mut l = limits();
        l.velocity = 0.0;
        let b = BoundarySpec::anchored_at(l, 0.0, 1.0);
        let err = b.validate().unwrap_err();
        assert!(err.to_string().contains("velocity_constrain"), "{err}");
    }
}
