use plotkit_core::Point;
use plotkit_toolpath::{BiarcFitter, CubicSegment, FitTolerance, Primitive};
use proptest::prelude::*;
use std::f64::consts::TAU;

fn distance_to_line(a: Point, b: Point, p: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.dot(&ab);
    if len2 == 0.0 {
        return p.distance_to(&a);
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    p.distance_to(&a.lerp(&b, t))
}

fn distance_to_arc(start: Point, center: Point, to: Point, sweep: f64, p: Point) -> f64 {
    let radius = start.distance_to(&center);
    let mut offset = (p - center).angle() - (start - center).angle();
    // Measure the offset in the winding direction
    if sweep >= 0.0 {
        offset = offset.rem_euclid(TAU);
    } else {
        offset = -(-offset).rem_euclid(TAU);
    }
    if offset.abs() <= sweep.abs() {
        (p.distance_to(&center) - radius).abs()
    } else {
        p.distance_to(&start).min(p.distance_to(&to))
    }
}

/// Densely sampled maximum distance from the curve to the fitted output.
fn measured_deviation(seg: &CubicSegment, out: &[Primitive]) -> f64 {
    let mut pieces = Vec::new();
    let mut cursor = seg.p0;
    for primitive in out {
        pieces.push((cursor, *primitive));
        if let Some(to) = primitive.end_point() {
            cursor = to;
        }
    }

    (0..=500)
        .map(|j| seg.point_at(j as f64 / 500.0))
        .map(|p| {
            pieces
                .iter()
                .map(|(start, primitive)| match *primitive {
                    Primitive::Line { to } => distance_to_line(*start, to, p),
                    Primitive::Arc { center, to, sweep } => {
                        distance_to_arc(*start, center, to, sweep, p)
                    }
                    _ => f64::INFINITY,
                })
                .fold(f64::INFINITY, f64::min)
        })
        .fold(0.0, f64::max)
}

#[test]
fn test_deviation_within_tolerance() {
    let seg = CubicSegment::new(
        Point::new(0.0, 0.0),
        Point::new(10.0, 40.0),
        Point::new(60.0, 40.0),
        Point::new(80.0, 0.0),
    );

    for tolerance in [0.5, 0.05] {
        let mut fitter = BiarcFitter::new(FitTolerance {
            biarc_tolerance: tolerance,
            ..FitTolerance::default()
        });
        let out = fitter.fit(&seg, 0.0, 0.0, 0);
        assert_eq!(fitter.stats().recursion_limit_hits, 0);

        let deviation = measured_deviation(&seg, &out);
        assert!(
            deviation <= tolerance,
            "deviation {} exceeds tolerance {}",
            deviation,
            tolerance
        );
    }
}

#[test]
fn test_tighter_tolerance_splits_more() {
    let seg = CubicSegment::new(
        Point::new(0.0, 0.0),
        Point::new(10.0, 40.0),
        Point::new(60.0, 40.0),
        Point::new(80.0, 0.0),
    );
    let count = |tolerance: f64| {
        let mut fitter = BiarcFitter::new(FitTolerance {
            biarc_tolerance: tolerance,
            ..FitTolerance::default()
        });
        fitter.fit(&seg, 0.0, 0.0, 0).len()
    };
    assert!(count(0.05) > count(0.5));
}

#[test]
fn test_unusable_arcs_still_meet_tolerance() {
    let seg = CubicSegment::new(
        Point::new(-41.63, -70.06),
        Point::new(79.39, 57.23),
        Point::new(-93.96, -63.47),
        Point::new(21.35, -48.54),
    );

    for tolerance in [
        FitTolerance {
            biarc_tolerance: 0.5,
            max_split_depth: 10,
            ..FitTolerance::default()
        },
        FitTolerance::default(),
    ] {
        let mut fitter = BiarcFitter::new(tolerance);
        let out = fitter.fit(&seg, 0.0, 0.0, 0);
        let deviation = measured_deviation(&seg, &out);
        assert!(
            deviation <= tolerance.biarc_tolerance || fitter.stats().recursion_limit_hits > 0,
            "deviation {} exceeds tolerance {} with no recursion limit hit",
            deviation,
            tolerance.biarc_tolerance
        );
    }
}

fn point() -> impl Strategy<Value = Point> {
    (-100.0f64..100.0, -100.0f64..100.0).prop_map(|(x, y)| Point::new(x, y))
}

proptest! {
    #[test]
    fn fit_stays_within_tolerance_below_depth_limit(
        p0 in point(),
        p1 in point(),
        p2 in point(),
        p3 in point(),
        tolerance in prop::sample::select(vec![0.1, 0.5, 1.0]),
    ) {
        let seg = CubicSegment::new(p0, p1, p2, p3);
        let mut fitter = BiarcFitter::new(FitTolerance {
            biarc_tolerance: tolerance,
            max_split_depth: 10,
            ..FitTolerance::default()
        });
        let out = fitter.fit(&seg, 0.0, 0.0, 0);
        prop_assume!(fitter.stats().recursion_limit_hits == 0);

        let deviation = measured_deviation(&seg, &out);
        prop_assert!(
            deviation <= tolerance,
            "deviation {} exceeds tolerance {}",
            deviation,
            tolerance
        );
    }
}
