use plotkit_core::{Point, Transform};
use plotkit_gcode::{EmitterConfig, ToolpathEmitter};
use plotkit_toolpath::{CubicSegment, PathNormalizer};

fn upper_semicircle(r: f64) -> CubicSegment {
    let k = 4.0 / 3.0 * r;
    CubicSegment::new(
        Point::new(r, 0.0),
        Point::new(r, k),
        Point::new(-r, k),
        Point::new(-r, 0.0),
    )
}

fn emit_semicircle(transform: Transform) -> Vec<String> {
    let mut normalizer = PathNormalizer::default();
    let path = normalizer.normalize("arc", &[vec![upper_semicircle(10.0)]]);
    let config = EmitterConfig {
        transform,
        ..EmitterConfig::default()
    };
    let mut emitter = ToolpathEmitter::new(config).unwrap();
    emitter.emit_path(&path);
    emitter.finish().into_lines()
}

#[test]
fn test_counter_clockwise_arc() {
    let lines = emit_semicircle(Transform::identity());
    assert!(lines.contains(&"G00 X10.000 Y0.000 F2000".to_string()));
    assert!(lines.contains(&"G03 X-10.000 Y0.000 I-10.000 J0.000 F300".to_string()));
    assert!(!lines.iter().any(|l| l.starts_with("G02")));
}

#[test]
fn test_flipped_axis_reverses_arc_direction() {
    let lines = emit_semicircle(Transform::identity().with_flip_y(true));
    assert!(lines.contains(&"G02 X-10.000 Y0.000 I-10.000 J0.000 F300".to_string()));
    assert!(!lines.iter().any(|l| l.starts_with("G03")));
}

#[test]
fn test_double_mirror_keeps_direction() {
    let transform = Transform::new(-1.0, 1.0, 0.0, 0.0)
        .unwrap()
        .with_flip_y(true);
    assert!(!transform.is_mirrored());
    let lines = emit_semicircle(transform);
    assert!(lines.contains(&"G03 X10.000 Y0.000 I10.000 J0.000 F300".to_string()));
}
