use nalgebra::{Matrix3, Vector3};

/// Attitude implied by a commanded acceleration under differential flatness.
///
/// The body thrust axis follows `a + g ẑ` and the heading is pinned by
/// `yaw`. Returns `(roll, pitch, yaw)` in radians, or `None` when the thrust
/// axis is degenerate (zero, or parallel to the heading's lateral axis).
pub fn estimated_rotation(
    acceleration: &Vector3<f64>,
    yaw: f64,
    gravity: f64,
) -> Option<Vector3<f64>> {
    const EPS: f64 = 1e-12;

    let alpha = acceleration + Vector3::new(0.0, 0.0, gravity);
    let y_c = Vector3::new(-yaw.sin(), yaw.cos(), 0.0);
    let x_b = y_c.cross(&alpha).try_normalize(EPS)?;
    let y_b = alpha.cross(&x_b).try_normalize(EPS)?;
    let z_b = x_b.cross(&y_b);

    let r = Matrix3::from_columns(&[x_b, y_b, z_b]);
    Some(Vector3::new(
        r[(2, 1)].atan2(r[(2, 2)]),
        (-r[(2, 0)]).atan2(r[(2, 1)].hypot(r[(2, 2)])),
        r[(1, 0)].atan2(r[(0, 0)]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::GRAVITY;
    use approx::assert_relative_eq;

    #[test]
    fn hover_is_level() {
        let rpy = estimated_rotation(&Vector3::zeros(), 0.0, GRAVITY).unwrap();
        assert_relative_eq!(rpy, Vector3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn yaw_passes_through() {
        let rpy = estimated_rotation(&Vector3::zeros(), 0.7, GRAVITY).unwrap();
        assert_relative_eq!(rpy.z, 0.7, epsilon = 1e-12);
        assert_relative_eq!(rpy.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(rpy.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn forward_acceleration_pitches() {
        let a = Vector3::new(GRAVITY, 0.0, 0.0);
        let rpy = estimated_rotation(&a, 0.0, GRAVITY).unwrap();
        assert_relative_eq!(rpy.y, std::f64::consts::FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(rpy.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn lateral_acceleration_rolls() {
        let a = Vector3::new(0.0, -GRAVITY, 0.0);
        let rpy = estimated_rotation(&a, 0.0, GRAVITY).unwrap();
        assert_relative_eq!(rpy.x.abs(), std::f64::consts::FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(rpy.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn free_fall_is_degenerate() {
        let a = Vector3::new(0.0, 0.0, -GRAVITY);
        assert!(estimated_rotation(&a, 0.0, GRAVITY).is_none());
    }
}
