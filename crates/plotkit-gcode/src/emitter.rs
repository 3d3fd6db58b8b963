//! Toolpath emitter
//!
//! A pen state machine that turns toolpath primitives into motion command
//! lines. The pen starts up; the first lift of a job is always written so
//! the physical tool reaches a known state. Travel below `min_travel` is
//! coalesced. Arc direction follows the sweep sign and flips when the
//! transform mirrors the drawing.

use crate::command::{MotionCommand, MotionKind};
use crate::error::{GcodeError, GcodeResult};
use plotkit_core::{Point, Transform};
use plotkit_toolpath::{Path, Primitive};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::trace;

/// Start and end radii closer than this use the centre-offset arc form.
pub const ARC_RADIUS_AGREEMENT: f64 = 0.001;

/// Pen state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PenState {
    #[default]
    Up,
    Down,
}

/// Emitter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Document to machine transform
    pub transform: Transform,
    /// Feed rate for cuts
    pub cut_feed: u32,
    /// Feed rate for travel moves
    pub travel_feed: u32,
    /// Moves this short (document units) are skipped
    pub min_travel: f64,
    /// Arcs with a smaller radius (document units) are cut as lines
    pub min_arc_radius: f64,
    /// Lines written to lift the pen
    pub pen_up: Vec<String>,
    /// Lines written to lower the pen
    pub pen_down: Vec<String>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            cut_feed: 300,
            travel_feed: 2000,
            min_travel: 1.0,
            min_arc_radius: 0.0005,
            pen_up: vec!["M3 S100".to_string(), "G4 P0.1".to_string()],
            pen_down: vec!["M3 S0".to_string(), "G4 P0.1".to_string()],
        }
    }
}

impl EmitterConfig {
    /// Validate the configuration
    pub fn validate(&self) -> GcodeResult<()> {
        self.transform.validate()?;
        if self.pen_up.is_empty() || self.pen_up.iter().all(|l| l.trim().is_empty()) {
            return Err(GcodeError::InvalidConfig("pen-up macro is empty".to_string()));
        }
        if self.pen_down.is_empty() || self.pen_down.iter().all(|l| l.trim().is_empty()) {
            return Err(GcodeError::InvalidConfig("pen-down macro is empty".to_string()));
        }
        if self.pen_up == self.pen_down {
            return Err(GcodeError::InvalidConfig(
                "pen-up and pen-down macros are identical".to_string(),
            ));
        }
        if !self.min_travel.is_finite() || self.min_travel < 0.0 {
            return Err(GcodeError::InvalidConfig(format!(
                "min_travel must not be negative, got {}",
                self.min_travel
            )));
        }
        if !self.min_arc_radius.is_finite() || self.min_arc_radius < 0.0 {
            return Err(GcodeError::InvalidConfig(format!(
                "min_arc_radius must not be negative, got {}",
                self.min_arc_radius
            )));
        }
        Ok(())
    }
}

/// Tool state carried through one job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolState {
    pub pen: PenState,
    /// Whether a pen command has been written yet
    pub synced: bool,
    /// Last commanded position in document units
    pub last_position: Option<Point>,
    /// The next cut carries the cut feed
    pub feed_pending: bool,
}

impl ToolState {
    pub fn is_pen_down(&self) -> bool {
        self.pen == PenState::Down
    }
}

/// Emitted command lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandStream {
    lines: Vec<String>,
}

impl CommandStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }

    pub fn append(&mut self, other: CommandStream) {
        self.lines.extend(other.lines);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True when the stream ends with exactly `tail`.
    pub fn ends_with(&self, tail: &[String]) -> bool {
        !tail.is_empty() && self.lines.ends_with(tail)
    }

    /// Newline-terminated program text.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

/// Converts primitives into motion commands.
#[derive(Debug, Clone)]
pub struct ToolpathEmitter {
    config: EmitterConfig,
    default_cut_feed: u32,
    state: ToolState,
    output: CommandStream,
}

impl ToolpathEmitter {
    /// Creates an emitter with the pen assumed up.
    pub fn new(config: EmitterConfig) -> GcodeResult<Self> {
        config.validate()?;
        Ok(Self {
            default_cut_feed: config.cut_feed,
            config,
            state: ToolState::default(),
            output: CommandStream::new(),
        })
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    /// Overrides the cut feed, e.g. for one layer. `None` restores the
    /// configured feed.
    pub fn set_cut_feed(&mut self, feed: Option<u32>) {
        self.config.cut_feed = feed.unwrap_or(self.default_cut_feed);
    }

    /// Replaces the transform, keeping the tool state.
    pub fn set_transform(&mut self, transform: Transform) -> GcodeResult<()> {
        transform.validate()?;
        self.config.transform = transform;
        Ok(())
    }

    /// Emits every primitive of each path in order, lifting the pen at
    /// every path boundary.
    pub fn emit_paths(&mut self, paths: &[Path]) {
        for path in paths {
            self.emit_path(path);
        }
    }

    pub fn emit_path(&mut self, path: &Path) {
        trace!(path = %path.id, primitives = path.primitives.len(), "emitting path");
        for primitive in &path.primitives {
            self.emit(primitive);
        }
        self.lift_if_down();
    }

    pub fn emit(&mut self, primitive: &Primitive) {
        match *primitive {
            Primitive::Move { to } => self.emit_move(to),
            Primitive::Line { to } => self.emit_line(to),
            Primitive::Arc { center, to, sweep } => self.emit_arc(center, to, sweep),
            Primitive::End => self.lift_if_down(),
        }
    }

    fn emit_move(&mut self, to: Point) {
        if let Some(last) = self.state.last_position {
            if last.distance_to(&to) <= self.config.min_travel {
                trace!("coalescing short move to {}", to);
                return;
            }
        }

        self.pen_up();
        let target = self.config.transform.apply(to);
        self.output
            .push(MotionCommand::rapid(target, Some(self.config.travel_feed)).to_string());
        self.state.last_position = Some(to);
    }

    fn emit_line(&mut self, to: Point) {
        self.pen_down();
        let target = self.config.transform.apply(to);
        let feed = self.take_feed();
        self.output.push(MotionCommand::linear(target, feed).to_string());
        self.state.last_position = Some(to);
    }

    fn emit_arc(&mut self, center: Point, to: Point, sweep: f64) {
        let Some(start) = self.state.last_position else {
            return self.emit_line(to);
        };
        let start_radius = start.distance_to(&center);
        let end_radius = to.distance_to(&center);
        if start_radius < self.config.min_arc_radius || sweep == 0.0 {
            return self.emit_line(to);
        }

        self.pen_down();
        let transform = self.config.transform;
        let counter_clockwise = (sweep > 0.0) != transform.is_mirrored();
        let kind = MotionKind::arc(counter_clockwise);
        let target = transform.apply(to);
        let feed = self.take_feed();

        let command = if (start_radius - end_radius).abs() < ARC_RADIUS_AGREEMENT {
            let offset = transform.apply_vector(center - start);
            MotionCommand::arc_with_offset(kind, target, offset, feed)
        } else {
            // Negative R selects the long way round
            let mut radius = transform.scale_length((start_radius + end_radius) / 2.0);
            if sweep.abs() > PI {
                radius = -radius;
            }
            MotionCommand::arc_with_radius(kind, target, radius, feed)
        };
        self.output.push(command.to_string());
        self.state.last_position = Some(to);
    }

    fn take_feed(&mut self) -> Option<u32> {
        if self.state.feed_pending {
            self.state.feed_pending = false;
            Some(self.config.cut_feed)
        } else {
            None
        }
    }

    /// Lifts the pen unless it is known to be up already.
    pub fn pen_up(&mut self) {
        if self.state.is_pen_down() || !self.state.synced {
            self.output.extend(self.config.pen_up.iter().cloned());
            self.state.pen = PenState::Up;
            self.state.synced = true;
        }
    }

    fn lift_if_down(&mut self) {
        if self.state.is_pen_down() {
            self.pen_up();
        }
    }

    fn pen_down(&mut self) {
        if !self.state.is_pen_down() {
            self.output.extend(self.config.pen_down.iter().cloned());
            self.state.pen = PenState::Down;
            self.state.synced = true;
            self.state.feed_pending = true;
        }
    }

    /// True when the output written so far ends with the pen-up macro.
    pub fn ends_with_pen_up(&self) -> bool {
        self.output.ends_with(&self.config.pen_up)
    }

    pub fn output(&self) -> &CommandStream {
        &self.output
    }

    /// Takes the lines written so far; the tool state is kept.
    pub fn take_output(&mut self) -> CommandStream {
        std::mem::take(&mut self.output)
    }

    /// Lifts the pen if needed and returns the remaining output.
    pub fn finish(mut self) -> CommandStream {
        self.lift_if_down();
        self.output
    }
}
