//! Extent/offset post-processing
//!
//! Works on emitted command text. Extents come from the `X`/`Y` operands of
//! `G00` and `G01` lines only; arc lines are not scanned. Translation
//! shifts the `X`/`Y` operands of motion lines and leaves everything else
//! untouched.

use crate::command::MotionCommand;
use crate::emitter::CommandStream;
use plotkit_core::BoundingBox;
use tracing::trace;

fn motion(line: &str) -> Option<MotionCommand> {
    match MotionCommand::parse(line) {
        Ok(command) => command,
        Err(err) => {
            trace!("{}; left as is", err);
            None
        }
    }
}

/// Extents of all rapid and linear moves, or `None` when there are none.
///
/// Moves that name only one axis are not counted.
pub fn extents<S: AsRef<str>>(lines: &[S]) -> Option<BoundingBox> {
    let mut bounds: Option<BoundingBox> = None;
    for command in lines.iter().filter_map(|line| motion(line.as_ref())) {
        if command.kind.is_arc() {
            continue;
        }
        let Some(p) = command.position() else {
            continue;
        };
        match bounds.as_mut() {
            Some(b) => b.include(p),
            None => bounds = Some(BoundingBox::from_point(p)),
        }
    }
    bounds
}

/// Adds `(dx, dy)` to the `X`/`Y` operands of every motion line.
///
/// Other lines, and lines that do not parse, are returned unchanged. A
/// trailing `;` comment is kept.
pub fn translate<S: AsRef<str>>(lines: &[S], dx: f64, dy: f64) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            let line = line.as_ref();
            let Some(mut command) = motion(line) else {
                return line.to_string();
            };
            command.x = command.x.map(|x| x + dx);
            command.y = command.y.map(|y| y + dy);
            match line.find(';') {
                Some(at) => format!("{} {}", command, &line[at..]),
                None => command.to_string(),
            }
        })
        .collect()
}

/// Translates every stream so the merged extents start at the origin.
///
/// Returns the extents before translation; streams without any rapid or
/// linear moves leave everything untouched.
pub fn normalize_streams(streams: &mut [CommandStream]) -> Option<BoundingBox> {
    let bounds = streams
        .iter()
        .map(|s| extents(s.lines()))
        .fold(None, BoundingBox::merge)?;

    let (dx, dy) = bounds.origin_offset();
    for stream in streams.iter_mut() {
        *stream = CommandStream::from_lines(translate(stream.lines(), dx, dy));
    }
    Some(bounds)
}
