//! Motion command model
//!
//! The four emitted motion words and their operands. Commands format as a
//! space-separated line: the motion word, axis tokens (`X`, `Y`, then `I`,
//! `J` for arc centre offsets), an optional `F` feed and an optional `R`
//! radius. Every decimal operand carries three places.

use crate::error::{GcodeError, GcodeResult};
use plotkit_core::{format_coordinate, Point};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Motion word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionKind {
    /// G00 - travel with the tool lifted
    Rapid,
    /// G01 - straight cut
    Linear,
    /// G02 - clockwise arc
    ArcCw,
    /// G03 - counter-clockwise arc
    ArcCcw,
}

impl MotionKind {
    pub fn word(&self) -> &'static str {
        match self {
            Self::Rapid => "G00",
            Self::Linear => "G01",
            Self::ArcCw => "G02",
            Self::ArcCcw => "G03",
        }
    }

    /// Arc word for the given winding.
    pub fn arc(counter_clockwise: bool) -> Self {
        if counter_clockwise {
            Self::ArcCcw
        } else {
            Self::ArcCw
        }
    }

    pub fn is_arc(&self) -> bool {
        matches!(self, Self::ArcCw | Self::ArcCcw)
    }
}

impl fmt::Display for MotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.word())
    }
}

impl FromStr for MotionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "G00" | "G0" => Ok(Self::Rapid),
            "G01" | "G1" => Ok(Self::Linear),
            "G02" | "G2" => Ok(Self::ArcCw),
            "G03" | "G3" => Ok(Self::ArcCcw),
            _ => Err(format!("Unknown motion word: {}", s)),
        }
    }
}

/// One motion command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionCommand {
    pub kind: MotionKind,
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Arc centre offset from the start point, X component
    pub i: Option<f64>,
    /// Arc centre offset from the start point, Y component
    pub j: Option<f64>,
    pub feed: Option<u32>,
    pub radius: Option<f64>,
}

impl MotionCommand {
    fn to_point(kind: MotionKind, to: Point) -> Self {
        Self {
            kind,
            x: Some(to.x),
            y: Some(to.y),
            i: None,
            j: None,
            feed: None,
            radius: None,
        }
    }

    /// `G00` travel to `to`.
    pub fn rapid(to: Point, feed: Option<u32>) -> Self {
        Self {
            feed,
            ..Self::to_point(MotionKind::Rapid, to)
        }
    }

    /// `G01` cut to `to`.
    pub fn linear(to: Point, feed: Option<u32>) -> Self {
        Self {
            feed,
            ..Self::to_point(MotionKind::Linear, to)
        }
    }

    /// Arc in centre-offset form.
    pub fn arc_with_offset(kind: MotionKind, to: Point, offset: Point, feed: Option<u32>) -> Self {
        Self {
            i: Some(offset.x),
            j: Some(offset.y),
            feed,
            ..Self::to_point(kind, to)
        }
    }

    /// Arc in explicit-radius form.
    pub fn arc_with_radius(kind: MotionKind, to: Point, radius: f64, feed: Option<u32>) -> Self {
        Self {
            radius: Some(radius),
            feed,
            ..Self::to_point(kind, to)
        }
    }

    /// Target position, when both axes are present.
    pub fn position(&self) -> Option<Point> {
        Some(Point::new(self.x?, self.y?))
    }

    /// Parses a motion line; returns `Ok(None)` for anything that is not a
    /// motion command (comments, macros, blank lines).
    pub fn parse(line: &str) -> GcodeResult<Option<MotionCommand>> {
        static MOTION_REGEX: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
        static OPERAND_REGEX: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
        let motion = MOTION_REGEX
            .get_or_init(|| Regex::new(r"^\s*(G0?[0-3])(?:\s|$)").expect("invalid regex pattern"));
        let operand = OPERAND_REGEX.get_or_init(|| {
            Regex::new(r"^([XYIJFR])(-?\d+(?:\.\d+)?)$").expect("invalid regex pattern")
        });

        let Some(captures) = motion.captures(line) else {
            return Ok(None);
        };
        let invalid = |reason: String| GcodeError::InvalidCommand {
            line: line.to_string(),
            reason,
        };
        let kind = captures[1].parse::<MotionKind>().map_err(invalid)?;

        let mut command = MotionCommand {
            kind,
            x: None,
            y: None,
            i: None,
            j: None,
            feed: None,
            radius: None,
        };
        for token in line.split_whitespace().skip(1) {
            if token.starts_with(';') {
                break;
            }
            let Some(operand) = operand.captures(token) else {
                return Err(invalid(format!("unexpected token '{}'", token)));
            };
            let value: f64 = operand[2]
                .parse()
                .map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?;
            match &operand[1] {
                "X" => command.x = Some(value),
                "Y" => command.y = Some(value),
                "I" => command.i = Some(value),
                "J" => command.j = Some(value),
                "R" => command.radius = Some(value),
                _ => {
                    if value < 0.0 || value.fract() != 0.0 {
                        return Err(invalid(format!("feed '{}' is not a whole number", token)));
                    }
                    command.feed = Some(value as u32);
                }
            }
        }
        Ok(Some(command))
    }
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.word())?;
        let axes = [("X", self.x), ("Y", self.y), ("I", self.i), ("J", self.j)];
        for (axis, value) in axes {
            if let Some(value) = value {
                write!(f, " {}{}", axis, format_coordinate(value))?;
            }
        }
        if let Some(feed) = self.feed {
            write!(f, " F{}", feed)?;
        }
        if let Some(radius) = self.radius {
            write!(f, " R{}", format_coordinate(radius))?;
        }
        Ok(())
    }
}
