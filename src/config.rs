//! Glider parameter document (TOML).

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::vehicle::{
    AeroConstants, BoundarySpec, PhysicalParameters, StateLimits, StateWeight,
    AIR_DENSITY_SEA_LEVEL, GRAVITY,
};

/// Geometry, mass properties and limits of one glider.
///
/// Field names follow the parameter files shipped with the glider rig,
/// misspellings included.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDocument {
    pub length_cg_to_cwing: f64,         // m
    pub length_pivote_to_celevator: f64, // m
    pub length_cg_to_pivote: f64,        // m
    pub surface_area_wing: f64,          // m^2
    pub surface_area_elevator: f64,      // m^2
    pub mass: f64,                       // kg
    pub moments_of_inertia: f64,         // kg·m^2
    pub velocity_constrain: f64,         // m/s
    pub theta_contrain: f64,             // rad
    pub phi_contrain: f64,               // rad
    pub thetadot_constrain: f64,         // rad/s
    pub phidot_constrain: f64,           // rad/s
    #[serde(default = "default_air_density")]
    pub air_density: f64, // kg/m^3
    #[serde(default = "default_gravity")]
    pub gravity: f64, // m/s^2
}

fn default_air_density() -> f64 {
    AIR_DENSITY_SEA_LEVEL
}
fn default_gravity() -> f64 {
    GRAVITY
}

impl ParameterDocument {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn limits(&self) -> StateLimits {
        StateLimits {
            theta: self.theta_contrain,
            phi: self.phi_contrain,
            velocity: self.velocity_constrain,
            thetadot: self.thetadot_constrain,
            phidot: self.phidot_constrain,
        }
    }

    /// Physical parameters for a solve with step `timestep` and weights `Q`, `R`.
    pub fn to_parameters(
        &self,
        timestep: f64,
        state_weight: StateWeight,
        control_weight: f64,
    ) -> PhysicalParameters {
        PhysicalParameters::builder()
            .wing_arm(self.length_cg_to_cwing)
            .elevator_arm(self.length_pivote_to_celevator)
            .pivot_arm(self.length_cg_to_pivote)
            .wing_area(self.surface_area_wing)
            .elevator_area(self.surface_area_elevator)
            .mass(self.mass)
            .inertia(self.moments_of_inertia)
            .timestep(timestep)
            .state_weight(state_weight)
            .control_weight(control_weight)
            .aero(AeroConstants {
                air_density: self.air_density,
                gravity: self.gravity,
            })
            .build()
    }

    pub fn boundary(&self, initial_x: Vec<f64>, initial_z: Vec<f64>) -> BoundarySpec {
        BoundarySpec::new(self.limits(), initial_x, initial_z)
    }
}
