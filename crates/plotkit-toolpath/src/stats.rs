//! Fitting diagnostics.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Counters collected while fitting segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitStats {
    /// Input segments fitted (subdivisions not included)
    pub segments: usize,
    /// Line primitives produced
    pub lines: usize,
    /// Arc primitives produced
    pub arcs: usize,
    /// Subdivisions performed
    pub splits: usize,
    /// Straight-line fallbacks for degenerate geometry
    pub degenerate: usize,
    /// Pieces accepted at the maximum split depth without meeting tolerance
    pub recursion_limit_hits: usize,
}

impl FitStats {
    /// Total primitives produced.
    pub fn primitives(&self) -> usize {
        self.lines + self.arcs
    }
}

impl AddAssign for FitStats {
    fn add_assign(&mut self, other: FitStats) {
        self.segments += other.segments;
        self.lines += other.lines;
        self.arcs += other.arcs;
        self.splits += other.splits;
        self.degenerate += other.degenerate;
        self.recursion_limit_hits += other.recursion_limit_hits;
    }
}
