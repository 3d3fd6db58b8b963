//! Biarc fitting of cubic Bezier segments.
//!
//! A segment is approximated by two tangent-continuous circular arcs that
//! share the segment's end tangents. When the biarc deviates from the curve
//! by more than the tolerance, the segment is split at its arc-length
//! midpoint and both halves are fitted again, down to a bounded depth.
//!
//! Straight inputs (collinear control points, zero tangents) become a single
//! line. When the arcs are unusable (huge or tiny radii) the chord is tried
//! instead and held to the same tolerance. Solve failures force a
//! subdivision. Nothing is reported to the caller; outcomes are counted in
//! [`FitStats`].

use crate::bezier::{CubicSegment, LENGTH_TOLERANCE};
use crate::primitive::Primitive;
use crate::stats::FitStats;
use plotkit_core::{
    CompileError, GeometryError, Point, STRAIGHT_DISTANCE_TOLERANCE, STRAIGHT_TOLERANCE,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, trace};

/// Threshold for treating a quadratic coefficient as zero.
const COEFFICIENT_EPSILON: f64 = 1e-10;

/// Arc centres further than this from the origin are rejected.
const MAX_CENTER_COORDINATE: f64 = 1_000_000.0;

/// Samples in the first deviation estimate.
const INITIAL_SAMPLES: usize = 10;

/// Estimates closer than this end the sample doubling.
const SAMPLE_TOLERANCE: f64 = 0.001;

/// Maximum sampling rounds (10, 20, 40, 80 samples).
const MAX_SAMPLE_ROUNDS: usize = 4;

/// Ternary search steps when refining a sampled maximum.
const REFINE_STEPS: usize = 24;

/// Tolerances controlling the fitter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitTolerance {
    /// Maximum allowed distance between the curve and its arcs
    pub biarc_tolerance: f64,
    /// Maximum recursion depth for subdivision
    pub max_split_depth: u32,
    /// Arcs with a smaller radius are emitted as lines
    pub min_arc_radius: f64,
}

impl Default for FitTolerance {
    fn default() -> Self {
        Self {
            biarc_tolerance: 1.0,
            max_split_depth: 4,
            min_arc_radius: 0.0005,
        }
    }
}

impl FitTolerance {
    /// Rejects tolerances the fitter cannot work with.
    pub fn validate(&self) -> Result<(), CompileError> {
        if !self.biarc_tolerance.is_finite() || self.biarc_tolerance <= 0.0 {
            return Err(CompileError::InvalidTolerance {
                name: "biarc_tolerance".to_string(),
                reason: format!("must be positive, got {}", self.biarc_tolerance),
            });
        }
        if !self.min_arc_radius.is_finite() || self.min_arc_radius < 0.0 {
            return Err(CompileError::InvalidTolerance {
                name: "min_arc_radius".to_string(),
                reason: format!("must not be negative, got {}", self.min_arc_radius),
            });
        }
        Ok(())
    }
}

/// A primitive together with the auxiliary `z` value at its end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedPrimitive {
    pub primitive: Primitive,
    pub z: f64,
}

/// One arc of a biarc, kept in solver form.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ArcPiece {
    start: Point,
    end: Point,
    center: Point,
    sweep: f64,
}

impl ArcPiece {
    fn radius(&self) -> f64 {
        (self.start - self.center).mag()
    }

    fn length(&self) -> f64 {
        (self.radius() * self.sweep).abs()
    }

    /// Distance from `p` to the arc, or to the nearer endpoint when the
    /// projection of `p` falls outside the swept range.
    fn distance_to(&self, p: Point) -> f64 {
        let r = self.radius();
        if r <= 0.0 {
            return p.distance_to(&self.start);
        }

        let on_circle = self.center + (p - self.center).unit() * r;
        let mut alpha = (on_circle - self.center).angle() - (self.start - self.center).angle();
        if self.sweep * alpha < 0.0 {
            if alpha > 0.0 {
                alpha -= 2.0 * PI;
            } else {
                alpha += 2.0 * PI;
            }
        }

        if alpha >= self.sweep.min(0.0) && alpha <= self.sweep.max(0.0) {
            (p - on_circle).mag()
        } else {
            p.distance_to(&self.start).min(p.distance_to(&self.end))
        }
    }
}

/// Outcome of solving one segment
#[derive(Debug, Clone, Copy, PartialEq)]
enum Biarc {
    /// Straight segment; draw the chord
    Line,
    /// The arcs were unusable; the chord stands in if it is close enough
    Chord,
    /// Two tangent-continuous arcs
    Arcs(ArcPiece, ArcPiece),
}

/// Centre and sweep of the arc from `a` to `c` whose tangents meet at `m`.
fn arc_through(a: Point, m: Point, c: Point, min_arc_radius: f64) -> Result<ArcPiece, GeometryError> {
    let d = (a + c) / 2.0;
    let dm = (d - m).mag();
    if dm == 0.0 {
        return Err(GeometryError::DegenerateGeometry {
            reason: "helper point on chord midpoint".to_string(),
        });
    }

    let center = d - (m - d).unit() * ((d - a).mag().powi(2) / dm);
    if !center.is_finite()
        || center.x.abs() > MAX_CENTER_COORDINATE
        || center.y.abs() > MAX_CENTER_COORDINATE
    {
        return Err(GeometryError::DegenerateGeometry {
            reason: format!("arc centre {} out of range", center),
        });
    }

    let tau = 2.0 * PI;
    let a_angle = (a - center).angle().rem_euclid(tau);
    let m_angle = (m - center).angle().rem_euclid(tau);
    let c_angle = (c - center).angle().rem_euclid(tau);
    let mut sweep = (c_angle - a_angle).rem_euclid(tau);
    if (a_angle < c_angle && (m_angle < a_angle || c_angle < m_angle))
        || (c_angle < m_angle && m_angle < a_angle)
    {
        sweep -= tau;
    }

    let radius = (a - center).mag();
    if radius < min_arc_radius {
        return Err(GeometryError::DegenerateGeometry {
            reason: format!("arc radius {} below minimum", radius),
        });
    }

    Ok(ArcPiece {
        start: a,
        end: c,
        center,
        sweep,
    })
}

/// Fits cubic segments with biarcs and keeps diagnostics across calls.
#[derive(Debug, Clone, Default)]
pub struct BiarcFitter {
    tolerance: FitTolerance,
    stats: FitStats,
}

impl BiarcFitter {
    pub fn new(tolerance: FitTolerance) -> Self {
        Self {
            tolerance,
            stats: FitStats::default(),
        }
    }

    /// Creates a fitter after validating the tolerances.
    pub fn try_new(tolerance: FitTolerance) -> Result<Self, CompileError> {
        tolerance.validate()?;
        Ok(Self::new(tolerance))
    }

    pub fn tolerance(&self) -> &FitTolerance {
        &self.tolerance
    }

    pub fn stats(&self) -> &FitStats {
        &self.stats
    }

    /// Returns the collected diagnostics and resets them.
    pub fn take_stats(&mut self) -> FitStats {
        std::mem::take(&mut self.stats)
    }

    /// Approximates `segment` by lines and arcs.
    ///
    /// The first primitive starts at `segment.p0` and the last one ends
    /// exactly at `segment.p3`.
    pub fn fit(
        &mut self,
        segment: &CubicSegment,
        z_start: f64,
        z_end: f64,
        depth: u32,
    ) -> Vec<Primitive> {
        self.fit_with_z(segment, z_start, z_end, depth)
            .into_iter()
            .map(|fitted| fitted.primitive)
            .collect()
    }

    /// Like [`fit`](Self::fit), keeping the `z` value blended along the
    /// segment by arc length.
    pub fn fit_with_z(
        &mut self,
        segment: &CubicSegment,
        z_start: f64,
        z_end: f64,
        depth: u32,
    ) -> Vec<FittedPrimitive> {
        self.stats.segments += 1;
        let mut out = Vec::new();
        self.fit_recursive(segment, z_start, z_end, depth, &mut out);
        out
    }

    fn fit_recursive(
        &mut self,
        segment: &CubicSegment,
        z1: f64,
        z2: f64,
        depth: u32,
        out: &mut Vec<FittedPrimitive>,
    ) {
        let candidate = match self.solve(segment) {
            Ok(Biarc::Line) => {
                self.push_line(segment, z2, out);
                return;
            }
            Ok(candidate) => candidate,
            Err(err) => {
                if depth < self.tolerance.max_split_depth {
                    trace!(depth, "{}; splitting", err);
                    self.split(segment, z1, z2, depth, out);
                } else {
                    debug!(depth, "{}; drawing chord", err);
                    self.stats.recursion_limit_hits += 1;
                    self.push_line(segment, z2, out);
                }
                return;
            }
        };

        let deviation = match candidate {
            Biarc::Arcs(first, second) => {
                deviation(segment, |p| first.distance_to(p).min(second.distance_to(p)))
            }
            _ => deviation(segment, |p| distance_to_chord(segment.p0, segment.p3, p)),
        };
        if deviation > self.tolerance.biarc_tolerance {
            if depth < self.tolerance.max_split_depth {
                trace!(depth, deviation, "fit out of tolerance, splitting");
                self.split(segment, z1, z2, depth, out);
                return;
            }
            let err = GeometryError::RecursionLimitReached { depth };
            debug!(deviation, "{}", err);
            self.stats.recursion_limit_hits += 1;
        }

        match candidate {
            Biarc::Arcs(first, second) => self.push_arcs(first, second, z1, z2, out),
            _ => self.push_line(segment, z2, out),
        }
    }

    fn split(
        &mut self,
        segment: &CubicSegment,
        z1: f64,
        z2: f64,
        depth: u32,
        out: &mut Vec<FittedPrimitive>,
    ) {
        self.stats.splits += 1;
        let (left, right) = segment.split_at_length(0.5, LENGTH_TOLERANCE);
        let l1 = left.length(LENGTH_TOLERANCE);
        let l2 = right.length(LENGTH_TOLERANCE);
        let zm = if l1 + l2 > 0.0 {
            z1 + (z2 - z1) * l1 / (l1 + l2)
        } else {
            z1 + (z2 - z1) / 2.0
        };
        self.fit_recursive(&left, z1, zm, depth + 1, out);
        self.fit_recursive(&right, zm, z2, depth + 1, out);
    }

    fn push_line(&mut self, segment: &CubicSegment, z: f64, out: &mut Vec<FittedPrimitive>) {
        self.stats.lines += 1;
        out.push(FittedPrimitive {
            primitive: Primitive::Line { to: segment.p3 },
            z,
        });
    }

    fn push_arcs(
        &mut self,
        first: ArcPiece,
        second: ArcPiece,
        z1: f64,
        z2: f64,
        out: &mut Vec<FittedPrimitive>,
    ) {
        let co_circular = (first.center - second.center).mag() < STRAIGHT_DISTANCE_TOLERANCE
            && (first.radius() - second.radius()).abs() < STRAIGHT_DISTANCE_TOLERANCE
            && first.sweep * second.sweep > 0.0;
        if co_circular {
            self.stats.arcs += 1;
            out.push(FittedPrimitive {
                primitive: Primitive::Arc {
                    center: first.center,
                    to: second.end,
                    sweep: first.sweep + second.sweep,
                },
                z: z2,
            });
            return;
        }

        let (l1, l2) = (first.length(), second.length());
        let zm = if l1 + l2 > 0.0 {
            z1 + (z2 - z1) * l1 / (l1 + l2)
        } else {
            z2
        };
        self.stats.arcs += 2;
        out.push(FittedPrimitive {
            primitive: Primitive::Arc {
                center: first.center,
                to: first.end,
                sweep: first.sweep,
            },
            z: zm,
        });
        out.push(FittedPrimitive {
            primitive: Primitive::Arc {
                center: second.center,
                to: second.end,
                sweep: second.sweep,
            },
            z: z2,
        });
    }

    /// Solves the biarc for one segment.
    ///
    /// `Err` means the segment must be subdivided.
    fn solve(&mut self, segment: &CubicSegment) -> Result<Biarc, GeometryError> {
        let p0 = segment.p0;
        let p4 = segment.p3;
        let mut ts = segment.p1 - p0;
        let mut te = p4 - segment.p2;
        let v = p0 - p4;
        let ts_angle = ts.angle();
        let te_angle = te.angle();

        if ts.mag() < STRAIGHT_DISTANCE_TOLERANCE && te.mag() < STRAIGHT_DISTANCE_TOLERANCE {
            return Ok(Biarc::Line);
        }

        let r;
        // A zero chord leaves r unbounded; it is rejected below unless the
        // segment is already classified as straight
        if te.mag() < STRAIGHT_DISTANCE_TOLERANCE {
            te = -(ts + v).unit();
            r = ts.mag() / v.mag() * 2.0;
        } else if ts.mag() < STRAIGHT_DISTANCE_TOLERANCE {
            ts = -(te + v).unit();
            r = 1.0 / (te.mag() / v.mag() * 2.0);
        } else {
            r = ts.mag() / te.mag();
        }
        let ts = ts.unit();
        let te = te.unit();

        let skew = (ts_angle - te_angle).rem_euclid(PI);
        let tangents_parallel = skew < STRAIGHT_TOLERANCE || PI - skew < STRAIGHT_TOLERANCE;
        if tangents_parallel {
            let short = v.mag() < STRAIGHT_DISTANCE_TOLERANCE
                || te.mag() < STRAIGHT_DISTANCE_TOLERANCE
                || ts.mag() < STRAIGHT_DISTANCE_TOLERANCE;
            if short || 1.0 - (ts.dot(&v) / (ts.mag() * v.mag())).abs() < STRAIGHT_TOLERANCE {
                return Ok(Biarc::Line);
            }
        }

        if v.mag() == 0.0 || !r.is_finite() {
            return Err(zero_chord());
        }

        let c = v.dot(&v);
        let b = 2.0 * v.dot(&(ts * r + te));
        let a = 2.0 * r * (ts.dot(&te) - 1.0);
        let a_small = a.abs() < COEFFICIENT_EPSILON;
        let c_small = c.abs() < COEFFICIENT_EPSILON;

        let beta = if a_small && b != 0.0 {
            -c / b
        } else if c_small && a != 0.0 {
            -b / a
        } else if !a_small {
            let discriminant = b * b - 4.0 * a * c;
            if discriminant < 0.0 {
                return Err(GeometryError::NegativeDiscriminant { discriminant });
            }
            let root = discriminant.sqrt();
            let beta1 = (-b - root) / 2.0 / a;
            let beta2 = (-b + root) / 2.0 / a;
            if beta1 * beta2 > 0.0 {
                return Err(GeometryError::BiarcDegenerate { beta1, beta2 });
            }
            beta1.max(beta2)
        } else {
            return Err(GeometryError::Underdetermined);
        };

        let alpha = beta * r;
        let ab = alpha + beta;
        let p1 = p0 + ts * alpha;
        let p3 = p4 - te * beta;
        let p2 = p1 * (beta / ab) + p3 * (alpha / ab);
        if !p2.is_finite() {
            return Err(GeometryError::DegenerateGeometry {
                reason: "biarc junction is not finite".to_string(),
            });
        }

        let min_radius = self.tolerance.min_arc_radius;
        let arcs = arc_through(p0, p1, p2, min_radius)
            .and_then(|first| arc_through(p2, p3, p4, min_radius).map(|second| (first, second)));
        match arcs {
            Ok((first, second))
                if first.radius() >= STRAIGHT_TOLERANCE && second.radius() >= STRAIGHT_TOLERANCE =>
            {
                Ok(Biarc::Arcs(first, second))
            }
            Ok(_) => {
                self.stats.degenerate += 1;
                trace!("biarc radius below straight tolerance, trying chord");
                Ok(Biarc::Chord)
            }
            Err(err) => {
                self.stats.degenerate += 1;
                trace!("{}, trying chord", err);
                Ok(Biarc::Chord)
            }
        }
    }
}

fn zero_chord() -> GeometryError {
    GeometryError::DegenerateGeometry {
        reason: "zero-length chord".to_string(),
    }
}

/// Distance from `p` to the straight segment `a`-`b`.
fn distance_to_chord(a: Point, b: Point, p: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.dot(&ab);
    if len2 == 0.0 {
        return p.distance_to(&a);
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    p.distance_to(&a.lerp(&b, t))
}

/// Maximum of `distance` along the curve.
///
/// Samples double until successive estimates settle. Each local maximum of
/// the last round is then narrowed by ternary search between its
/// neighbours.
fn deviation<F: Fn(Point) -> f64>(segment: &CubicSegment, distance: F) -> f64 {
    let at = |t: f64| distance(segment.point_at(t));
    let mut samples = INITIAL_SAMPLES;
    let mut values = Vec::new();
    let mut worst = 0.0_f64;

    for round in 0..MAX_SAMPLE_ROUNDS {
        let previous = worst;
        values = (0..=samples).map(|j| at(j as f64 / samples as f64)).collect();
        worst = values.iter().fold(worst, |acc, &d| acc.max(d));
        if round > 0 && (worst - previous).abs() <= SAMPLE_TOLERANCE {
            break;
        }
        if round + 1 < MAX_SAMPLE_ROUNDS {
            samples *= 2;
        }
    }

    let last = values.len() - 1;
    for j in 0..=last {
        let left = if j > 0 { values[j - 1] } else { f64::NEG_INFINITY };
        let right = values.get(j + 1).copied().unwrap_or(f64::NEG_INFINITY);
        if values[j] < left || values[j] < right {
            continue;
        }
        let mut lo = j.saturating_sub(1) as f64 / last as f64;
        let mut hi = (j + 1).min(last) as f64 / last as f64;
        for _ in 0..REFINE_STEPS {
            let m1 = lo + (hi - lo) / 3.0;
            let m2 = hi - (hi - lo) / 3.0;
            if at(m1) < at(m2) {
                lo = m1;
            } else {
                hi = m2;
            }
        }
        worst = worst.max(at((lo + hi) / 2.0));
    }
    worst
}
