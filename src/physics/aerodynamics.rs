use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// Flat-plate aerodynamics (valid through stall, all angles of attack)
// ---------------------------------------------------------------------------

/// Flat-plate lift coefficient: `2 sin(a) cos(a)`.
pub fn lift_coefficient(alpha: f64) -> f64 {
    2.0 * alpha.sin() * alpha.cos()
}

/// Flat-plate drag coefficient: `2 sin^2(a)`.
pub fn drag_coefficient(alpha: f64) -> f64 {
    2.0 * alpha.sin().powi(2)
}

/// Direction of a surface's velocity in the x-z plane, rad.
///
/// Uses the full-quadrant arctangent. A surface at rest has no defined flow
/// direction; it is reported as 0, which is harmless because the force
/// scales with the squared speed.
pub fn flow_angle(velocity: &Vector2<f64>) -> f64 {
    if velocity.x == 0.0 && velocity.y == 0.0 {
        return 0.0;
    }
    velocity.y.atan2(velocity.x)
}

/// 2D cross product (z-component of the 3D cross product).
pub fn cross2(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Unit normal of a plate inclined at `angle` from the x axis.
pub fn plate_normal(angle: f64) -> Vector2<f64> {
    Vector2::new(-angle.sin(), angle.cos())
}

/// Aerodynamic force on a flat plate, directed along its normal.
///
/// Magnitude is `0.5 * rho * |v|^2 * area * (Cl + Cd)`.
pub fn plate_force(
    velocity: &Vector2<f64>,
    alpha: f64,
    area: f64,
    normal: &Vector2<f64>,
    density: f64,
) -> Vector2<f64> {
    let q_dyn = 0.5 * density * velocity.norm_squared();
    normal * (q_dyn * area * (lift_coefficient(alpha) + drag_coefficient(alpha)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn coefficients_at_zero_aoa() {
        assert!(lift_coefficient(0.0).abs() < 1e-12);
        assert!(drag_coefficient(0.0).abs() < 1e-12);
    }

    #[test]
    fn lift_peaks_at_45_degrees() {
        assert!((lift_coefficient(FRAC_PI_4) - 1.0).abs() < 1e-12);
        assert!(lift_coefficient(FRAC_PI_4) > lift_coefficient(0.6));
        assert!(lift_coefficient(FRAC_PI_4) > lift_coefficient(0.9));
    }

    #[test]
    fn flow_angle_keeps_quadrant() {
        let backward = Vector2::new(-1.0, 0.0);
        assert!((flow_angle(&backward).abs() - std::f64::consts::PI).abs() < 1e-12);
        let down = Vector2::new(0.0, -2.0);
        assert!((flow_angle(&down) + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn flow_angle_defined_at_rest() {
        assert_eq!(flow_angle(&Vector2::zeros()), 0.0);
    }

    #[test]
    fn coefficients_are_pi_periodic() {
        // Flipping the flow by pi must not change the force.
        for alpha in [-1.2, -0.3, 0.2, 0.8, 1.5] {
            let shifted = alpha + std::f64::consts::PI;
            assert!((lift_coefficient(alpha) - lift_coefficient(shifted)).abs() < 1e-12);
            assert!((drag_coefficient(alpha) - drag_coefficient(shifted)).abs() < 1e-12);
        }
    }

    #[test]
    fn no_force_at_rest() {
        let f = plate_force(&Vector2::zeros(), 0.5, 0.02, &plate_normal(0.0), 1.225);
        assert!(f.norm() < 1e-15);
    }

    #[test]
    fn force_along_normal() {
        let n = plate_normal(0.3);
        let f = plate_force(&Vector2::new(5.0, 0.0), 0.3, 0.02, &n, 1.225);
        assert!(cross2(&n, &f).abs() < 1e-12);
        assert!(f.dot(&n) > 0.0);
    }

    #[test]
    fn cross2_orientation() {
        let x = Vector2::new(1.0, 0.0);
        let z = Vector2::new(0.0, 1.0);
        assert_eq!(cross2(&x, &z), 1.0);
        assert_eq!(cross2(&z, &x), -1.0);
    }
}
