//! Flattens cubic subpaths into toolpath primitives.

use crate::bezier::CubicSegment;
use crate::biarc::{BiarcFitter, FitTolerance};
use crate::primitive::{Path, Primitive};
use crate::stats::FitStats;
use plotkit_core::{CompileError, STRAIGHT_DISTANCE_TOLERANCE};
use tracing::debug;

/// A connected run of cubic segments.
pub type Subpath = Vec<CubicSegment>;

/// Turns subpaths into `Move`, fitted cuts and `End`, one path per shape.
#[derive(Debug, Clone, Default)]
pub struct PathNormalizer {
    fitter: BiarcFitter,
}

impl PathNormalizer {
    pub fn new(tolerance: FitTolerance) -> Result<Self, CompileError> {
        Ok(Self {
            fitter: BiarcFitter::try_new(tolerance)?,
        })
    }

    /// Normalises one shape. Subpaths keep their input order; subpaths
    /// without segments are skipped.
    pub fn normalize(&mut self, id: impl Into<String>, subpaths: &[Subpath]) -> Path {
        let id = id.into();
        let mut primitives = Vec::new();

        for subpath in subpaths {
            let Some(first) = subpath.first() else {
                debug!(path = %id, "skipping empty subpath");
                continue;
            };

            primitives.push(Primitive::Move { to: first.p0 });
            let mut cursor = first.p0;
            for segment in subpath {
                if segment.p0.distance_to(&cursor) > STRAIGHT_DISTANCE_TOLERANCE {
                    debug!(path = %id, "bridging gap at {}", cursor);
                    primitives.push(Primitive::Line { to: segment.p0 });
                }
                primitives.extend(self.fitter.fit(segment, 0.0, 0.0, 0));
                cursor = segment.p3;
            }
            primitives.push(Primitive::End);
        }

        Path::new(id, primitives)
    }

    pub fn stats(&self) -> &FitStats {
        self.fitter.stats()
    }

    pub fn take_stats(&mut self) -> FitStats {
        self.fitter.take_stats()
    }
}
