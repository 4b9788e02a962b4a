//! Physical and algorithmic properties checked through the public API.

use approx::assert_relative_eq;
use fieldlines::charge::{Field, LineCharge, PointCharge, PolygonCharge};
use fieldlines::collection::ChargeCollection;
use fieldlines::equalizer::equalize;
use fieldlines::request::SimulationRequest;
use fieldlines::tracer::{Direction, FieldLineTracer, Termination};
use fieldlines::validate::{ValidationError, validate};
use fieldlines::vector::Vector2;
use serde_json::json;

fn finite(field: Field) -> Vector2 {
    field.vector().expect("field should be finite here")
}

fn mixed_collection(order: &[usize]) -> ChargeCollection {
    let mut collection = ChargeCollection::default();
    for &i in order {
        match i {
            0 => collection.push_charge(PointCharge::new(2.0, Vector2::new(-1.0, 0.3))),
            1 => collection.push_charge(LineCharge::new(
                -1.5,
                Vector2::new(0.5, -1.0),
                Vector2::new(1.5, 0.5),
            )),
            _ => collection.push_charge(PolygonCharge::new(
                0.7,
                Vector2::new(0.2, 2.0),
                5,
                0.4,
                0.3,
            )),
        }
    }
    collection
}

#[test]
fn superposition_does_not_depend_on_charge_order() {
    let orders = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    let probes = [
        Vector2::new(0.0, 0.0),
        Vector2::new(-2.3, 1.7),
        Vector2::new(3.1, -0.4),
    ];
    let reference = mixed_collection(&orders[0]);

    for order in &orders[1..] {
        let permuted = mixed_collection(order);
        for &p in &probes {
            let a = finite(reference.field_at(p));
            let b = finite(permuted.field_at(p));
            let tolerance = 1e-12 * a.magnitude();
            assert_relative_eq!(a.x, b.x, epsilon = tolerance);
            assert_relative_eq!(a.y, b.y, epsilon = tolerance);

            let u = reference.potential_at(p).to_f64();
            let v = permuted.potential_at(p).to_f64();
            assert_relative_eq!(u, v, epsilon = 1e-3, max_relative = 1e-12);
        }
    }
}

#[test]
fn symmetric_dipole_field_on_bisector_is_parallel_to_the_axis() {
    let mut collection = ChargeCollection::default();
    collection.push_charge(PointCharge::new(1.0, Vector2::new(-1.0, 0.0)));
    collection.push_charge(PointCharge::new(-1.0, Vector2::new(1.0, 0.0)));

    for y in [-3.0, -0.5, 0.0, 0.25, 2.0] {
        let field = finite(collection.field_at(Vector2::new(0.0, y)));
        // Perpendicular to the bisector, pointing from + to -.
        assert!(field.x > 0.0);
        assert_relative_eq!(field.y, 0.0, epsilon = 1e-9 * field.x);
    }
}

#[test]
fn point_charge_is_singular_at_its_own_position() {
    for (q, p) in [
        (1.0, Vector2::new(0.0, 0.0)),
        (-3.5, Vector2::new(12.0, -7.0)),
        (1e-9, Vector2::new(-0.1, 0.4)),
    ] {
        let charge = PointCharge::new(q, p);
        assert!(!charge.field_at(p).is_finite());
        assert!(charge.potential_at(p).is_singular());
    }
}

#[test]
fn line_charge_looks_like_a_point_charge_from_far_away() {
    let line = LineCharge::new(4.0, Vector2::new(-0.5, 0.2), Vector2::new(0.5, -0.2));
    let point = PointCharge::new(4.0, line.midpoint());
    let length = line.length();

    for angle in [0.0_f64, 0.7, 1.5707963267948966, 2.4, 4.0] {
        let probe = line.midpoint() + Vector2::from_polar(100.0 * length, angle);
        let expected = finite(point.field_at(probe));
        let actual = finite(line.field_at(probe));
        let error = (actual - expected).magnitude() / expected.magnitude();
        assert!(error < 0.01, "relative error {error} at angle {angle}");

        let potential_error = (line.potential_at(probe).to_f64()
            - point.potential_at(probe).to_f64())
        .abs()
            / point.potential_at(probe).to_f64().abs();
        assert!(potential_error < 0.01);
    }
}

#[test]
fn equalizer_shares_the_highest_rank_among_ties() {
    let equalized = equalize(&[5.0, 5.0, 9.0, 9.0, 9.0, 1.0]);
    let expected = [0.4, 0.4, 1.0, 1.0, 1.0, 0.0];
    assert_eq!(equalized.len(), expected.len());
    for (actual, expected) in equalized.iter().zip(expected) {
        assert_relative_eq!(*actual, expected, epsilon = 1e-12);
    }
    assert!(equalized[5] < equalized[0] && equalized[0] < equalized[2]);
}

#[test]
fn every_walk_stops_within_the_iteration_cap() {
    let collection = mixed_collection(&[0, 1, 2]);
    for max_iterations in [0, 1, 7, 60] {
        for step in [1e-3, 0.05, 2.0] {
            let tracer = FieldLineTracer::new(&collection, step, max_iterations);
            for i in 0..10 {
                let seed = Vector2::new(-3.0 + 0.6 * f64::from(i), 1.0 - 0.3 * f64::from(i));
                for direction in [Direction::Downstream, Direction::Upstream] {
                    let walk = tracer.walk(seed, direction);
                    assert!(walk.points.len() <= max_iterations + 1);
                    assert_eq!(walk.points[0], seed);
                }
                let line = tracer.trace(seed);
                assert!(line.points.len() <= 2 * max_iterations + 1);
            }
        }
    }
}

#[test]
fn oversized_workload_is_rejected_before_tracing() {
    let charges: Vec<_> = (0..100)
        .map(|i| {
            json!({
                "type": "Point",
                "charge": if i % 2 == 0 { 1.0 } else { -1.0 },
                "position": {"x": f64::from(i) * 0.01, "y": 0.5}
            })
        })
        .collect();
    let flashlights: Vec<_> = (0..10)
        .map(|i| {
            json!({
                "type": "Circle",
                "fieldLineCount": 100,
                "position": {"x": f64::from(i) * 0.1, "y": 0.2},
                "radius": 0.05
            })
        })
        .collect();
    let body = json!({
        "input": {"charges": charges, "flashlights": flashlights},
        "output": {
            "maximumIterationsPerFieldLine": 1000,
            "stepPerIteration": 0.001,
            "minimumX": 0, "minimumY": 0, "maximumX": 1, "maximumY": 1
        }
    });

    let request = SimulationRequest::from_json(&body.to_string()).unwrap();
    assert_eq!(
        validate(&request).unwrap_err(),
        ValidationError::WorkBoundExceeded {
            field_lines: 1000,
            iterations: 1000,
            charges: 100,
        }
    );
}

#[test]
fn dipole_line_from_source_ends_at_sink() {
    let source = Vector2::new(0.2, 0.5);
    let sink = Vector2::new(0.8, 0.5);
    let mut collection = ChargeCollection::default();
    collection.push_charge(PointCharge::new(1e-9, source));
    collection.push_charge(PointCharge::new(-1e-9, sink));

    let step = 0.001;
    let tracer = FieldLineTracer::new(&collection, step, 5000);
    let walk = tracer.walk(source + Vector2::new(0.01, 0.0), Direction::Downstream);

    assert!(
        matches!(
            walk.termination,
            Termination::Singular | Termination::Reversal
        ),
        "stopped with {:?}",
        walk.termination
    );
    let last = *walk.points.last().unwrap();
    assert!(
        last.distance_to(sink) <= step * (1.0 + 1e-9),
        "ended at {last:?}"
    );
}
