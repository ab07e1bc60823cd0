use approx::assert_relative_eq;

use perch_glider::collocation::{inequality_count, inequality_residuals, ConstraintReport};
use perch_glider::cost;
use perch_glider::dynamics::GliderState;
use perch_glider::guess;
use perch_glider::optimizer::TrajectoryResult;
use perch_glider::vehicle::{BoundarySpec, PhysicalParameters, StateLimits, StateWeight};

fn limits() -> StateLimits {
    StateLimits {
        theta: 1.0,
        phi: 1.0,
        velocity: 5.0,
        thetadot: 5.0,
        phidot: 5.0,
    }
}

fn boundary() -> BoundarySpec {
    BoundarySpec::anchored_at(limits(), 0.0, 1.0)
}

#[test]
fn residual_vector_has_4_plus_26n_entries() {
    let p = PhysicalParameters::builder().build();
    let b = boundary();
    for n in [1usize, 2, 5, 20] {
        let z = vec![0.0; 8 * n];
        let r = inequality_residuals(&z, &p, &b).unwrap();
        assert_eq!(r.len(), 4 + 26 * n, "N = {n}");
        assert_eq!(r.len(), inequality_count(n));
    }
}

#[test]
fn fine_rollout_satisfies_every_residual() {
    // Level glide from the anchor, elevator held fixed.
    let p = PhysicalParameters::builder().timestep(0.005).build();
    let start = GliderState {
        x: 0.0,
        z: 1.0,
        xdot: 3.0,
        ..GliderState::default()
    };
    let z = guess::rollout_guess(&start, &[0.0; 10], &p).unwrap();
    let r = inequality_residuals(&z, &p, &boundary()).unwrap();
    let report = ConstraintReport::from_residuals(&r);
    assert!(report.is_feasible(), "{report:?}");
}

#[test]
fn single_knot_only_has_box_and_anchor_residuals() {
    let p = PhysicalParameters::builder().build();
    let z = [0.0, 1.0, 0.2, -0.1, 1.0, -1.0, 0.5, 0.3];
    let r = inequality_residuals(&z, &p, &boundary()).unwrap();
    assert_eq!(r.len(), 30);
    assert!(r[..14].iter().all(|v| *v == 0.0));
    assert!(r[14..26].iter().all(|v| *v < 0.0));
    assert!(r[26..].iter().all(|v| *v <= 0.0));
}

#[test]
fn cost_grows_with_each_weighted_component() {
    let q = StateWeight::from_diagonal(&nalgebra::SVector::<f64, 7>::from([
        1.0, 2.0, 0.5, 0.5, 3.0, 3.0, 0.1,
    ]));
    let p = PhysicalParameters::builder()
        .state_weight(q)
        .control_weight(0.2)
        .build();
    let b = boundary();
    let base = [0.0, 1.0, 0.1, 0.1, 1.0, -1.0, 0.2, 0.1];
    let j0 = cost::objective(&base, &p, &b);
    // Component 0 and 1 move the anchor as well, so start from index 2.
    for c in 2..8 {
        let mut bigger = base;
        bigger[c] *= 2.0;
        assert!(
            cost::objective(&bigger, &p, &b) > j0,
            "component {c} did not raise the cost"
        );
    }
}

#[test]
fn evaluation_is_deterministic_and_round_trips() {
    let p = PhysicalParameters::builder().duration(1.0, 10).build();
    let b = boundary();
    let z = guess::straight_line(
        nalgebra::Vector2::new(0.0, 1.0),
        nalgebra::Vector2::new(1.0, 0.0),
        10,
        1.0,
    )
    .unwrap();

    let r1 = inequality_residuals(&z, &p, &b).unwrap();
    let r2 = inequality_residuals(&z, &p, &b).unwrap();
    assert_eq!(r1, r2);
    assert_eq!(cost::objective(&z, &p, &b), cost::objective(&z, &p, &b));

    let t = TrajectoryResult::from_decision_vector(&z).unwrap();
    let thetadot: Vec<f64> = z.chunks_exact(8).map(|k| k[6]).collect();
    let phidot: Vec<f64> = z.chunks_exact(8).map(|k| k[7]).collect();
    let back = t.to_decision_vector(&thetadot, &phidot).unwrap();
    assert_eq!(back, z);
    assert_eq!(inequality_residuals(&back, &p, &b).unwrap(), r1);
    assert_relative_eq!(
        cost::objective(&back, &p, &b),
        cost::objective(&z, &p, &b),
        epsilon = 1e-12
    );
}
