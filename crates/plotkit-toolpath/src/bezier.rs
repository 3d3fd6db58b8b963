//! Cubic Bezier segment utilities.
//!
//! Point evaluation, de Casteljau splitting, arc length by Simpson
//! integration of the speed function, and splitting at a fraction of the
//! arc length.

use plotkit_core::Point;
use serde::{Deserialize, Serialize};

/// Absolute tolerance for arc length integration.
pub const LENGTH_TOLERANCE: f64 = 0.001;

/// Upper bound on Simpson subintervals.
const SIMPSON_LIMIT: usize = 4096;

/// Upper bound on bisection steps when searching for a length fraction.
const MAX_BISECTION_STEPS: usize = 64;

/// One cubic Bezier segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicSegment {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl CubicSegment {
    pub const fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// A straight segment with control points on the chord.
    pub fn line(from: Point, to: Point) -> Self {
        Self::new(from, from, to, to)
    }

    /// Point on the curve at parameter `t`.
    pub fn point_at(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        self.p0 * a + self.p1 * b + self.p2 * c + self.p3 * d
    }

    /// First derivative at parameter `t`.
    pub fn derivative(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        (self.p1 - self.p0) * (3.0 * mt * mt)
            + (self.p2 - self.p1) * (6.0 * mt * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }

    /// Splits at parameter `t` into two segments that meet at `point_at(t)`.
    pub fn split_at(&self, t: f64) -> (CubicSegment, CubicSegment) {
        let m1 = self.p0.lerp(&self.p1, t);
        let m2 = self.p1.lerp(&self.p2, t);
        let m3 = self.p2.lerp(&self.p3, t);
        let m12 = m1.lerp(&m2, t);
        let m23 = m2.lerp(&m3, t);
        let mid = m12.lerp(&m23, t);
        (
            CubicSegment::new(self.p0, m1, m12, mid),
            CubicSegment::new(mid, m23, m3, self.p3),
        )
    }

    /// Arc length over `[0, 1]`.
    pub fn length(&self, tolerance: f64) -> f64 {
        self.length_to(1.0, tolerance)
    }

    /// Arc length over `[0, t]`.
    pub fn length_to(&self, t: f64, tolerance: f64) -> f64 {
        simpson(|s| self.derivative(s).mag(), 0.0, t, tolerance)
    }

    /// Parameter at which the arc length reaches `fraction` of the total.
    ///
    /// A zero-length segment returns `0.5`.
    pub fn t_at_length(&self, fraction: f64, tolerance: f64) -> f64 {
        let total = self.length(tolerance);
        if total <= 0.0 || !total.is_finite() {
            return 0.5;
        }

        let target = fraction.clamp(0.0, 1.0) * total;
        let mut t = 1.0;
        let mut step = 1.0;
        let mut diff = total - target;
        let mut steps = 0;
        while diff.abs() > tolerance && steps < MAX_BISECTION_STEPS {
            step /= 2.0;
            if diff < 0.0 {
                t += step;
            } else {
                t -= step;
            }
            diff = self.length_to(t, tolerance) - target;
            steps += 1;
        }
        t
    }

    /// Splits at `fraction` of the arc length.
    pub fn split_at_length(&self, fraction: f64, tolerance: f64) -> (CubicSegment, CubicSegment) {
        self.split_at(self.t_at_length(fraction, tolerance))
    }

    /// The same curve traversed from `p3` to `p0`.
    pub fn reversed(&self) -> CubicSegment {
        CubicSegment::new(self.p3, self.p2, self.p1, self.p0)
    }

    pub fn is_finite(&self) -> bool {
        self.p0.is_finite() && self.p1.is_finite() && self.p2.is_finite() && self.p3.is_finite()
    }
}

/// Composite Simpson integration, doubling the subintervals until two
/// successive estimates agree within `tolerance`.
fn simpson<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, tolerance: f64) -> f64 {
    let mut n = 2;
    let mut multiplier = (b - a) / 6.0;
    let endsum = f(a) + f(b);
    let mut interval = (b - a) / 2.0;
    let mut asum = 0.0;
    let mut bsum = f(a + interval);
    let mut est1 = multiplier * (endsum + 2.0 * asum + 4.0 * bsum);
    let mut est0 = 2.0 * est1;

    while n < SIMPSON_LIMIT && (est1 - est0).abs() > tolerance {
        n *= 2;
        multiplier /= 2.0;
        interval /= 2.0;
        asum += bsum;
        bsum = (1..n).step_by(2).map(|i| f(a + i as f64 * interval)).sum();
        est0 = est1;
        est1 = multiplier * (endsum + 2.0 * asum + 4.0 * bsum);
    }
    est1
}
