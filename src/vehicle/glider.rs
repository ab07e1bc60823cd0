use nalgebra::SMatrix;

use crate::dynamics::state::STATE_DIM;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

pub const AIR_DENSITY_SEA_LEVEL: f64 = 1.225; // kg/m^3
pub const GRAVITY: f64 = 9.81; // m/s^2

pub type StateWeight = SMatrix<f64, STATE_DIM, STATE_DIM>;

/// Environment constants used by the flat-plate model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AeroConstants {
    pub air_density: f64, // kg/m^3
    pub gravity: f64,     // m/s^2
}

impl Default for AeroConstants {
    fn default() -> Self {
        Self {
            air_density: AIR_DENSITY_SEA_LEVEL,
            gravity: GRAVITY,
        }
    }
}

// ---------------------------------------------------------------------------
// Glider definition (wing plate + hinged elevator plate)
// ---------------------------------------------------------------------------

/// Physical parameters shared read-only by dynamics, cost and constraints
/// during one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalParameters {
    pub wing_arm: f64,          // m, CG to wing centroid
    pub elevator_arm: f64,      // m, elevator pivot to elevator centroid
    pub pivot_arm: f64,         // m, CG to elevator pivot
    pub wing_area: f64,         // m^2
    pub elevator_area: f64,     // m^2
    pub mass: f64,              // kg
    pub inertia: f64,           // kg·m^2, pitch axis only
    pub timestep: f64,          // s, maneuver duration / knot count
    pub state_weight: StateWeight,
    pub control_weight: f64,
    pub aero: AeroConstants,
}

impl PhysicalParameters {
    pub fn builder() -> GliderBuilder {
        GliderBuilder::new()
    }

    /// Weight force magnitude, N.
    pub fn weight(&self) -> f64 {
        self.mass * self.aero.gravity
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("mass", self.mass)?;
        positive("moments_of_inertia", self.inertia)?;
        positive("timestep", self.timestep)?;
        positive("air_density", self.aero.air_density)?;
        non_negative("surface_area_wing", self.wing_area)?;
        non_negative("surface_area_elevator", self.elevator_area)?;
        non_negative("length_cg_to_cwing", self.wing_arm)?;
        non_negative("length_pivote_to_celevator", self.elevator_arm)?;
        non_negative("length_cg_to_pivote", self.pivot_arm)?;
        if !self.aero.gravity.is_finite() {
            return Err(ConfigError::invalid("gravity", "must be finite"));
        }
        if self.state_weight.iter().any(|w| !w.is_finite()) {
            return Err(ConfigError::invalid("state_weight", "contains non-finite entries"));
        }
        non_negative("control_weight", self.control_weight)
    }
}

pub(crate) fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {value}")))
    }
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be non-negative, got {value}")))
    }
}

// ---------------------------------------------------------------------------
// Glider builder
// ---------------------------------------------------------------------------

/// Builder defaults describe a small hand-launched perching glider.
pub struct GliderBuilder {
    wing_arm: f64,
    elevator_arm: f64,
    pivot_arm: f64,
    wing_area: f64,
    elevator_area: f64,
    mass: f64,
    inertia: f64,
    timestep: f64,
    state_weight: StateWeight,
    control_weight: f64,
    aero: AeroConstants,
}

impl GliderBuilder {
    pub fn new() -> Self {
        Self {
            wing_arm: 0.1,
            elevator_arm: 0.05,
            pivot_arm: 0.15,
            wing_area: 0.02,
            elevator_area: 0.01,
            mass: 0.1,
            inertia: 0.001,
            timestep: 0.1,
            state_weight: StateWeight::identity(),
            control_weight: 1.0,
            aero: AeroConstants::default(),
        }
    }

    pub fn wing_arm(mut self, v: f64) -> Self { self.wing_arm = v; self }
    pub fn elevator_arm(mut self, v: f64) -> Self { self.elevator_arm = v; self }
    pub fn pivot_arm(mut self, v: f64) -> Self { self.pivot_arm = v; self }
    pub fn wing_area(mut self, v: f64) -> Self { self.wing_area = v; self }
    pub fn elevator_area(mut self, v: f64) -> Self { self.elevator_area = v; self }
    pub fn mass(mut self, v: f64) -> Self { self.mass = v; self }
    pub fn inertia(mut self, v: f64) -> Self { self.inertia = v; self }
    pub fn timestep(mut self, v: f64) -> Self { self.timestep = v; self }
    pub fn state_weight(mut self, v: StateWeight) -> Self { self.state_weight = v; self }
    pub fn control_weight(mut self, v: f64) -> Self { self.control_weight = v; self }
    pub fn aero(mut self, v: AeroConstants) -> Self { self.aero = v; self }

    /// Uniform timestep from the total maneuver duration split over `knots`.
    pub fn duration(mut self, total: f64, knots: usize) -> Self {
        self.timestep = total / knots.max(1) as f64;
        self
    }

    pub fn build(self) -> PhysicalParameters {
        PhysicalParameters {
            wing_arm: self.wing_arm,
            elevator_arm: self.elevator_arm,
            pivot_arm: self.pivot_arm,
            wing_area: self.wing_area,
            elevator_area: self.elevator_area,
            mass: self.mass,
            inertia: self.inertia,
            timestep: self.timestep,
            state_weight: self.state_weight,
            control_weight: self.control_weight,
            aero: self.aero,
        }
    }
}

impl Default for GliderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_sets_uniform_timestep() {
        let p = PhysicalParameters::builder().duration(1.0, 10).build();
        assert!((p.timestep - 0.1).abs() < 1e-12);
    }

    #[test]
    fn default_glider_is_valid() {
        assert!(PhysicalParameters::builder().build().validate().is_ok());
    }

    #[test]
    fn zero_mass_rejected() {
        let p = PhysicalParameters::builder().mass(0.0).build();
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("mass"), "{err}");
    }

    #[test]
    fn negative_area_rejected() {
        let p = PhysicalParameters::builder().wing_area(-0.02).build();
        assert!(p.validate().is_err());
    }

    #[test]
    fn weight_uses_scoped_gravity() {
        let p = PhysicalParameters::builder()
            .mass(2.0)
            .aero(AeroConstants { air_density: 1.0, gravity: 1.62 })
            .build();
        assert!((p.weight() - 3.24).abs() < 1e-12);
    }
}
