//! # Plotkit G-code
//!
//! Pen-plotter G-code generation:
//! - [`MotionCommand`] model, formatting and parsing
//! - [`ToolpathEmitter`] pen state machine turning primitives into commands
//! - Extent scanning and origin translation of emitted programs
//! - [`JobCompiler`] running the full pipeline over a layered job
//! - Program assembly with banners, homing and double-sided passes

pub mod command;
pub mod emitter;
pub mod error;
pub mod job;
pub mod postprocess;
pub mod program;

pub use command::{MotionCommand, MotionKind};
pub use emitter::{
    CommandStream, EmitterConfig, PenState, ToolState, ToolpathEmitter, ARC_RADIUS_AGREEMENT,
};
pub use error::{GcodeError, GcodeResult};
pub use job::{
    CompileOptions, CompiledJob, CompiledLayer, Job, JobCompiler, LayerInput, PathInput,
};
pub use postprocess::{extents, normalize_streams, translate};
pub use program::{layer_banner, render_program, tool_change, ProgramOptions, TOOL_SLOTS};
