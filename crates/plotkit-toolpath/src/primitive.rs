//! Toolpath primitives and paths.

use plotkit_core::Point;
use serde::{Deserialize, Serialize};

/// One step of a normalised toolpath.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    /// Lift the tool and travel to `to`.
    Move { to: Point },
    /// Cut straight to `to`.
    Line { to: Point },
    /// Cut along a circular arc around `center` ending at `to`.
    ///
    /// Positive `sweep` is counter-clockwise in the document plane.
    Arc { center: Point, to: Point, sweep: f64 },
    /// End of a subpath.
    End,
}

impl Primitive {
    /// Where the tool is after this primitive, if it moves at all.
    pub fn end_point(&self) -> Option<Point> {
        match self {
            Primitive::Move { to } | Primitive::Line { to } | Primitive::Arc { to, .. } => {
                Some(*to)
            }
            Primitive::End => None,
        }
    }

    /// True for primitives that cut.
    pub fn is_drawing(&self) -> bool {
        matches!(self, Primitive::Line { .. } | Primitive::Arc { .. })
    }

    /// The same cut traversed back to `from`.
    fn reversed_to(&self, from: Point) -> Primitive {
        match *self {
            Primitive::Arc { center, sweep, .. } => Primitive::Arc {
                center,
                to: from,
                sweep: -sweep,
            },
            Primitive::Line { .. } => Primitive::Line { to: from },
            other => other,
        }
    }
}

/// A named sequence of primitives produced from one input shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub id: String,
    pub primitives: Vec<Primitive>,
}

impl Path {
    pub fn new(id: impl Into<String>, primitives: Vec<Primitive>) -> Self {
        Self {
            id: id.into(),
            primitives,
        }
    }

    /// True when the path cuts nothing.
    pub fn is_empty(&self) -> bool {
        !self.primitives.iter().any(Primitive::is_drawing)
    }

    /// First point of the path.
    pub fn start_point(&self) -> Option<Point> {
        self.primitives.iter().find_map(Primitive::end_point)
    }

    /// Endpoint of the last primitive that moves the tool.
    pub fn end_point(&self) -> Option<Point> {
        self.primitives.iter().rev().find_map(Primitive::end_point)
    }

    /// Paths can only be reversed when every cut has a known start.
    pub fn is_reversible(&self) -> bool {
        matches!(self.primitives.first(), Some(Primitive::Move { .. }))
    }

    /// Reverses the path in place: subpaths run in reverse order, each one
    /// traversed backwards with arc sweeps negated.
    ///
    /// Paths that do not start with a move are left untouched.
    pub fn reverse(&mut self) {
        if !self.is_reversible() {
            return;
        }

        let mut subpaths: Vec<Vec<Primitive>> = Vec::new();
        for primitive in &self.primitives {
            match primitive {
                Primitive::Move { .. } => subpaths.push(vec![*primitive]),
                _ => {
                    if let Some(current) = subpaths.last_mut() {
                        current.push(*primitive);
                    }
                }
            }
        }

        let mut reversed = Vec::with_capacity(self.primitives.len());
        for subpath in subpaths.iter().rev() {
            reversed.extend(reverse_subpath(subpath));
        }
        self.primitives = reversed;
    }
}

/// Reverses one `Move`-led run of primitives.
fn reverse_subpath(subpath: &[Primitive]) -> Vec<Primitive> {
    // Positions visited: the move target followed by every cut endpoint
    let mut visited: Vec<Point> = Vec::new();
    let mut cuts: Vec<Primitive> = Vec::new();
    let mut had_end = false;

    for primitive in subpath {
        match primitive {
            Primitive::Move { to } => visited.push(*to),
            Primitive::Line { to } | Primitive::Arc { to, .. } => {
                visited.push(*to);
                cuts.push(*primitive);
            }
            Primitive::End => had_end = true,
        }
    }

    let mut out = Vec::with_capacity(subpath.len());
    if let Some(last) = visited.last() {
        out.push(Primitive::Move { to: *last });
    }
    for (i, cut) in cuts.iter().enumerate().rev() {
        out.push(cut.reversed_to(visited[i]));
    }
    if had_end {
        out.push(Primitive::End);
    }
    out
}
