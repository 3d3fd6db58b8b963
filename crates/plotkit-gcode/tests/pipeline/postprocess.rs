use plotkit_gcode::{extents, normalize_streams, translate, CommandStream};
use proptest::prelude::*;

fn program() -> Vec<String> {
    [
        "M3 S100",
        "G4 P0.1",
        "G00 X12.500 Y-4.000 F2000",
        "M3 S0",
        "G01 X30.000 Y-4.000 F300",
        "G02 X40.000 Y6.000 I0.000 J10.000",
        "G01 X40.000 Y20.000",
    ]
    .iter()
    .map(|l| l.to_string())
    .collect()
}

#[test]
fn test_translate_back_and_forth() {
    let lines = program();
    let moved = translate(&lines, 7.25, -3.5);
    let restored = translate(&moved, -7.25, 3.5);
    assert_eq!(restored, lines);
}

#[test]
fn test_normalized_program_starts_at_origin() {
    let mut streams = vec![CommandStream::from_lines(program())];
    let before = normalize_streams(&mut streams).unwrap();
    assert_eq!((before.min_x, before.min_y), (12.5, -4.0));

    let after = extents(streams[0].lines()).unwrap();
    assert_eq!((after.min_x, after.min_y), (0.0, 0.0));
    assert_eq!((after.max_x, after.max_y), (27.5, 24.0));
    assert!(streams[0]
        .lines()
        .contains(&"G02 X27.500 Y10.000 I0.000 J10.000".to_string()));
}

proptest! {
    #[test]
    fn translate_shifts_extents(dx in -500i32..500, dy in -500i32..500) {
        let lines = program();
        let (dx, dy) = (dx as f64 / 4.0, dy as f64 / 4.0);
        let before = extents(&lines).unwrap();
        let after = extents(&translate(&lines, dx, dy)).unwrap();
        prop_assert!((after.min_x - (before.min_x + dx)).abs() < 1e-9);
        prop_assert!((after.min_y - (before.min_y + dy)).abs() < 1e-9);
        prop_assert!((after.max_x - (before.max_x + dx)).abs() < 1e-9);
        prop_assert!((after.max_y - (before.max_y + dy)).abs() < 1e-9);
    }
}
