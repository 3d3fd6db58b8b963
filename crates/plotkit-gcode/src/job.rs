//! Job compilation
//!
//! A job is a list of layers, each a list of named shapes made of cubic
//! subpaths. Compiling a job runs every stage in order:
//!
//! 1. normalise each shape into a [`Path`] with the biarc fitter
//! 2. drop shapes with nothing to draw
//! 3. order each layer's paths to reduce travel
//! 4. emit every layer through one emitter, so tool state carries over
//! 5. optionally emit a mirrored back-side pass
//! 6. optionally translate all output so the extents start at the origin

use crate::emitter::{CommandStream, EmitterConfig, ToolpathEmitter};
use crate::error::GcodeResult;
use crate::postprocess::{extents, normalize_streams};
use plotkit_core::{BoundingBox, CompileError};
use plotkit_toolpath::{order_paths, FitStats, FitTolerance, Path, PathNormalizer, Subpath};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One named shape of a job document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathInput {
    pub id: String,
    pub subpaths: Vec<Subpath>,
}

/// One layer of a job document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInput {
    pub id: String,
    /// Cut feed for this layer; the configured feed when absent
    #[serde(default)]
    pub feed: Option<u32>,
    pub paths: Vec<PathInput>,
}

/// A job document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub layers: Vec<LayerInput>,
}

impl Job {
    /// Parses a job from JSON.
    pub fn from_json(json: &str) -> GcodeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> GcodeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total number of shapes across all layers.
    pub fn path_count(&self) -> usize {
        self.layers.iter().map(|l| l.paths.len()).sum()
    }
}

/// Options controlling the stages after emission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Emit a mirrored second pass for the back of the material
    pub double_sided: bool,
    /// Translate the output so the extents start at the origin
    pub normalize_origin: bool,
}

/// Emitted commands for one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledLayer {
    pub id: String,
    /// Cut feed used for the layer
    pub feed: u32,
    pub commands: CommandStream,
}

/// Result of compiling a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledJob {
    /// Front-side layers in input order
    pub layers: Vec<CompiledLayer>,
    /// Mirrored back-side layers, empty unless double-sided
    pub back_layers: Vec<CompiledLayer>,
    /// Extents of all rapid and linear moves before normalisation
    pub bounds: Option<BoundingBox>,
    /// Biarc fitting diagnostics
    pub stats: FitStats,
    /// Identifiers of shapes with nothing to draw
    pub skipped: Vec<String>,
}

impl CompiledJob {
    /// All layer streams, front side first.
    pub fn streams(&self) -> impl Iterator<Item = &CompiledLayer> {
        self.layers.iter().chain(self.back_layers.iter())
    }
}

/// Compiles jobs into per-layer command streams.
#[derive(Debug, Clone)]
pub struct JobCompiler {
    tolerance: FitTolerance,
    emitter: EmitterConfig,
    options: CompileOptions,
}

impl JobCompiler {
    /// Creates a compiler, rejecting invalid tolerances or emitter settings.
    pub fn new(
        tolerance: FitTolerance,
        emitter: EmitterConfig,
        options: CompileOptions,
    ) -> GcodeResult<Self> {
        tolerance.validate()?;
        emitter.validate()?;
        Ok(Self {
            tolerance,
            emitter,
            options,
        })
    }

    pub fn emitter_config(&self) -> &EmitterConfig {
        &self.emitter
    }

    pub fn compile(&self, job: &Job) -> GcodeResult<CompiledJob> {
        let mut normalizer = PathNormalizer::new(self.tolerance)?;
        let mut skipped = Vec::new();
        let mut ordered_layers: Vec<(&LayerInput, Vec<Path>)> =
            Vec::with_capacity(job.layers.len());

        for layer in &job.layers {
            let mut paths = Vec::with_capacity(layer.paths.len());
            for input in &layer.paths {
                let path = normalizer.normalize(input.id.as_str(), &input.subpaths);
                if path.is_empty() {
                    let err = CompileError::EmptyPath { id: path.id.clone() };
                    warn!(layer = %layer.id, "{}, skipping", err);
                    skipped.push(path.id);
                } else {
                    paths.push(path);
                }
            }
            let ordered = order_paths(paths);
            debug!(layer = %layer.id, paths = ordered.len(), "layer ordered");
            ordered_layers.push((layer, ordered));
        }

        let stats = normalizer.take_stats();
        let mut layers = self.emit_pass(&ordered_layers, self.emitter.clone())?;

        let mut back_layers = if self.options.double_sided {
            let mut back = self.emitter.clone();
            back.transform = back.transform.mirrored_y();
            self.emit_pass(&ordered_layers, back)?
        } else {
            Vec::new()
        };

        let bounds = if self.options.normalize_origin {
            let mut streams: Vec<CommandStream> = layers
                .iter_mut()
                .chain(back_layers.iter_mut())
                .map(|l| std::mem::take(&mut l.commands))
                .collect();
            let bounds = normalize_streams(&mut streams);
            for (layer, stream) in layers.iter_mut().chain(back_layers.iter_mut()).zip(streams) {
                layer.commands = stream;
            }
            bounds
        } else {
            layers
                .iter()
                .chain(back_layers.iter())
                .map(|l| extents(l.commands.lines()))
                .fold(None, BoundingBox::merge)
        };

        info!(
            layers = layers.len(),
            segments = stats.segments,
            arcs = stats.arcs,
            lines = stats.lines,
            splits = stats.splits,
            recursion_limit_hits = stats.recursion_limit_hits,
            skipped = skipped.len(),
            "job compiled"
        );

        Ok(CompiledJob {
            layers,
            back_layers,
            bounds,
            stats,
            skipped,
        })
    }

    /// Emits every layer through one emitter.
    fn emit_pass(
        &self,
        ordered_layers: &[(&LayerInput, Vec<Path>)],
        config: EmitterConfig,
    ) -> GcodeResult<Vec<CompiledLayer>> {
        let mut emitter = ToolpathEmitter::new(config)?;
        let mut out = Vec::with_capacity(ordered_layers.len());
        for (layer, paths) in ordered_layers {
            emitter.set_cut_feed(layer.feed);
            emitter.emit_paths(paths);
            out.push(CompiledLayer {
                id: layer.id.clone(),
                feed: emitter.config().cut_feed,
                commands: emitter.take_output(),
            });
        }
        Ok(out)
    }
}
