use plotkit_core::Point;
use plotkit_toolpath::{order_paths, travel_distance, CubicSegment, PathNormalizer};

fn normalized(normalizer: &mut PathNormalizer, id: &str, from: (f64, f64), to: (f64, f64)) -> plotkit_toolpath::Path {
    let subpath = vec![CubicSegment::line(from.into(), to.into())];
    normalizer.normalize(id, &[subpath])
}

#[test]
fn test_orders_by_nearest_endpoint() {
    let mut normalizer = PathNormalizer::default();
    let paths = vec![
        normalized(&mut normalizer, "far", (5.0, 0.0), (5.0, 1.0)),
        normalized(&mut normalizer, "origin", (0.0, 0.0), (0.0, 1.0)),
        normalized(&mut normalizer, "middle", (2.0, 0.0), (2.0, 1.0)),
    ];

    let ordered = order_paths(paths);
    let starts: Vec<Point> = ordered.iter().filter_map(|p| p.start_point()).collect();
    assert_eq!(starts[0], Point::new(0.0, 0.0));
    assert_eq!(starts[1].x, 2.0);
    assert_eq!(starts[2].x, 5.0);
}

#[test]
fn test_reversal_reduces_travel() {
    let mut normalizer = PathNormalizer::default();
    let paths = vec![
        normalized(&mut normalizer, "a", (0.0, 0.0), (10.0, 0.0)),
        normalized(&mut normalizer, "b", (0.0, 5.0), (10.0, 5.0)),
    ];
    let before = travel_distance(&paths);
    let ordered = order_paths(paths);
    assert_eq!(ordered[1].start_point(), Some(Point::new(10.0, 5.0)));
    assert!(travel_distance(&ordered) < before);
}

#[test]
fn test_every_path_is_kept_once() {
    let mut normalizer = PathNormalizer::default();
    let paths: Vec<_> = (0..20)
        .map(|i| {
            let x = ((i * 7) % 20) as f64;
            normalized(&mut normalizer, &format!("p{}", i), (x, 0.0), (x, 3.0))
        })
        .collect();

    let ordered = order_paths(paths);
    assert_eq!(ordered.len(), 20);
    let mut ids: Vec<_> = ordered.iter().map(|p| p.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 20);
}
