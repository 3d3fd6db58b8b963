//! # Plotkit
//!
//! Compiles cubic Bezier artwork into pen-plotter G-code:
//! - Biarc fitting of every segment within a tolerance
//! - Nearest-neighbour path ordering with path reversal
//! - A pen state machine emitting rapid, linear and arc moves
//! - Extent scanning and origin normalisation of the output
//!
//! ## Architecture
//!
//! Plotkit is organized as a workspace with multiple crates:
//!
//! 1. **plotkit-core** - Points, transforms, bounding boxes, units, errors
//! 2. **plotkit-toolpath** - Bezier utilities, biarc fitter, normalizer, orderer
//! 3. **plotkit-gcode** - Emitter, post-processor, job compiler, program assembly
//! 4. **plotkit-settings** - Persisted configuration
//! 5. **plotkit** - Command-line binary tying the crates together

use anyhow::Context;
use std::path::Path;

pub use plotkit_core::{
    AxisOrigin, BoundingBox, CompileError, GeometryError, MeasurementSystem, Point, Transform,
};
pub use plotkit_gcode::{
    render_program, CompiledJob, EmitterConfig, GcodeError, Job, JobCompiler, ProgramOptions,
};
pub use plotkit_settings::{Config, SettingsError};
pub use plotkit_toolpath::{BiarcFitter, CubicSegment, FitStats, FitTolerance, Path as ToolPath};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Logs go to stderr so stdout carries only the program. The level follows
/// `RUST_LOG`.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Reads a job document from a JSON file.
pub fn load_job(path: &Path) -> anyhow::Result<Job> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file {}", path.display()))?;
    Ok(Job::from_json(&json)?)
}

/// Compiles a job with the given settings and assembles the program text.
pub fn compile_program(job: &Job, config: &Config) -> anyhow::Result<(CompiledJob, String)> {
    config.validate()?;
    let compiler = config.compiler()?;
    let compiled = compiler.compile(job)?;
    let program = render_program(
        &compiled,
        &config.to_program_options(),
        &compiler.emitter_config().pen_up,
    );
    Ok((compiled, program))
}
