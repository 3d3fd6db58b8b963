use plotkit_core::Point;
use plotkit_gcode::{
    render_program, CompileOptions, EmitterConfig, Job, JobCompiler, LayerInput, PathInput,
    ProgramOptions, ToolpathEmitter,
};
use plotkit_toolpath::{CubicSegment, FitTolerance, Primitive};

fn single_line_job() -> Job {
    Job {
        layers: vec![LayerInput {
            id: "layer1".to_string(),
            feed: None,
            paths: vec![PathInput {
                id: "line".to_string(),
                subpaths: vec![vec![CubicSegment::line(
                    Point::new(0.0, 0.0),
                    Point::new(10.0, 0.0),
                )]],
            }],
        }],
    }
}

#[test]
fn test_single_line_stream() {
    let compiler = JobCompiler::new(
        FitTolerance::default(),
        EmitterConfig::default(),
        CompileOptions::default(),
    )
    .unwrap();
    let compiled = compiler.compile(&single_line_job()).unwrap();

    assert_eq!(
        compiled.layers[0].commands.lines(),
        &[
            "M3 S100",
            "G4 P0.1",
            "G00 X0.000 Y0.000 F2000",
            "M3 S0",
            "G4 P0.1",
            "G01 X10.000 Y0.000 F300",
            "M3 S100",
            "G4 P0.1",
        ]
    );
    let bounds = compiled.bounds.unwrap();
    assert_eq!((bounds.min_x, bounds.max_x), (0.0, 10.0));
    assert_eq!(compiled.stats.lines, 1);
    assert!(compiled.skipped.is_empty());
}

#[test]
fn test_repeated_moves_add_nothing() {
    let mut emitter = ToolpathEmitter::new(EmitterConfig::default()).unwrap();
    let target = Point::new(4.0, 4.0);
    emitter.emit(&Primitive::Move { to: target });
    let once = emitter.output().clone();
    emitter.emit(&Primitive::Move { to: target });
    emitter.emit(&Primitive::Move { to: target });
    assert_eq!(emitter.output(), &once);
}

#[test]
fn test_pen_up_is_written_once_per_lift() {
    let mut emitter = ToolpathEmitter::new(EmitterConfig::default()).unwrap();
    emitter.pen_up();
    emitter.pen_up();
    assert_eq!(emitter.output().len(), 2);
    assert!(emitter.ends_with_pen_up());
}

#[test]
fn test_rendered_program_from_json() {
    let json = r#"{
        "layers": [{
            "id": "outline",
            "feed": 450,
            "paths": [{
                "id": "edge",
                "subpaths": [[{
                    "p0": {"x": 0.0, "y": 0.0},
                    "p1": {"x": 0.0, "y": 0.0},
                    "p2": {"x": 20.0, "y": 0.0},
                    "p3": {"x": 20.0, "y": 0.0}
                }]]
            }]
        }]
    }"#;
    let job = Job::from_json(json).unwrap();
    let config = EmitterConfig::default();
    let pen_up = config.pen_up.clone();
    let compiler =
        JobCompiler::new(FitTolerance::default(), config, CompileOptions::default()).unwrap();
    let compiled = compiler.compile(&job).unwrap();
    let text = render_program(&compiled, &ProgramOptions::default(), &pen_up);

    assert!(text.starts_with("G21 ; All units in mm\nG28 X Y ; home X and Y\n"));
    assert!(text.contains(";(***** Feed Rate: 450 "));
    assert!(text.contains("G01 X20.000 Y0.000 F450\n"));
    assert!(text.ends_with("M3 S100\nG4 P0.1\n"));
}

#[test]
fn test_invalid_job_document() {
    assert!(Job::from_json("{\"layers\": 3}").is_err());
}
