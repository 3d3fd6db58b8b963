use plotkit_core::Point;
use plotkit_toolpath::{BiarcFitter, CubicSegment, FitTolerance, Primitive};
use proptest::prelude::*;

fn point() -> impl Strategy<Value = Point> {
    (-100.0f64..100.0, -100.0f64..100.0).prop_map(|(x, y)| Point::new(x, y))
}

fn segment() -> impl Strategy<Value = CubicSegment> {
    (point(), point(), point(), point()).prop_map(|(a, b, c, d)| CubicSegment::new(a, b, c, d))
}

/// Control points on one line, with non-trivial tangents and chord.
fn collinear_segment() -> impl Strategy<Value = CubicSegment> {
    (
        point(),
        0.0f64..std::f64::consts::TAU,
        -50.0f64..50.0,
        prop::bool::ANY,
        1.0f64..20.0,
        1.0f64..20.0,
        1.0f64..60.0,
    )
        .prop_map(|(base, angle, s0, forward, t1, t2, chord)| {
            let dir = Point::new(angle.cos(), angle.sin());
            let sign = if forward { 1.0 } else { -1.0 };
            let s3 = s0 + chord;
            CubicSegment::new(
                base + dir * s0,
                base + dir * (s0 + sign * t1),
                base + dir * (s3 - sign * t2),
                base + dir * s3,
            )
        })
}

proptest! {
    #[test]
    fn fit_ends_exactly_at_segment_end(seg in segment()) {
        let mut fitter = BiarcFitter::new(FitTolerance::default());
        let out = fitter.fit(&seg, 0.0, 0.0, 0);
        prop_assert!(!out.is_empty());
        prop_assert_eq!(out.last().and_then(Primitive::end_point), Some(seg.p3));
    }

    #[test]
    fn fit_output_is_bounded_by_split_depth(seg in segment(), depth in 0u32..5) {
        let tolerance = FitTolerance {
            biarc_tolerance: 0.01,
            max_split_depth: depth,
            ..FitTolerance::default()
        };
        let mut fitter = BiarcFitter::new(tolerance);
        let out = fitter.fit(&seg, 0.0, 0.0, 0);
        let bound = 2usize << depth;
        prop_assert!(out.len() <= bound, "{} primitives for depth {}", out.len(), depth);
    }

    #[test]
    fn fit_arcs_respect_min_radius(seg in segment()) {
        let tolerance = FitTolerance::default();
        let mut fitter = BiarcFitter::new(tolerance);
        let mut cursor = seg.p0;
        for primitive in fitter.fit(&seg, 0.0, 0.0, 0) {
            prop_assert!(primitive.end_point().is_some_and(|p| p.is_finite()));
            if let Primitive::Arc { center, to, sweep } = primitive {
                prop_assert!(sweep.is_finite());
                prop_assert!(cursor.distance_to(&center) >= tolerance.min_arc_radius);
                cursor = to;
            } else if let Some(to) = primitive.end_point() {
                cursor = to;
            }
        }
    }

    #[test]
    fn collinear_segment_is_one_line(seg in collinear_segment()) {
        let mut fitter = BiarcFitter::new(FitTolerance::default());
        let out = fitter.fit(&seg, 0.0, 0.0, 0);
        prop_assert_eq!(out, vec![Primitive::Line { to: seg.p3 }]);
    }
}

#[test]
fn test_full_circle_from_two_semicircles() {
    let r = 10.0;
    let k = 4.0 / 3.0 * r;
    let upper = CubicSegment::new(
        Point::new(r, 0.0),
        Point::new(r, k),
        Point::new(-r, k),
        Point::new(-r, 0.0),
    );
    let lower = CubicSegment::new(
        Point::new(-r, 0.0),
        Point::new(-r, -k),
        Point::new(r, -k),
        Point::new(r, 0.0),
    );

    let mut fitter = BiarcFitter::new(FitTolerance::default());
    for seg in [upper, lower] {
        let out = fitter.fit(&seg, 0.0, 0.0, 0);
        assert_eq!(out.len(), 1, "expected one arc, got {:?}", out);
        let Primitive::Arc { center, to, sweep } = out[0] else {
            panic!("expected arc, got {:?}", out[0]);
        };
        assert!(
            (sweep - std::f64::consts::PI).abs() < 1e-9,
            "sweep {} should be pi",
            sweep
        );
        let start_radius = seg.p0.distance_to(&center);
        let end_radius = to.distance_to(&center);
        assert!((start_radius - r).abs() < 1e-9);
        assert!((start_radius - end_radius).abs() < 1e-9);
    }
    assert_eq!(fitter.stats().arcs, 2);
}

#[test]
fn test_max_depth_zero_never_splits() {
    let tolerance = FitTolerance {
        biarc_tolerance: 1e-6,
        max_split_depth: 0,
        ..FitTolerance::default()
    };
    let mut fitter = BiarcFitter::new(tolerance);
    let seg = CubicSegment::new(
        Point::new(0.0, 0.0),
        Point::new(5.0, 30.0),
        Point::new(40.0, 10.0),
        Point::new(50.0, 0.0),
    );
    let out = fitter.fit(&seg, 0.0, 0.0, 0);
    assert!(out.len() <= 2);
    assert_eq!(fitter.stats().splits, 0);
    assert_eq!(fitter.stats().recursion_limit_hits, 1);
}
