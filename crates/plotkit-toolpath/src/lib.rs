//! # Plotkit Toolpath
//!
//! Turns cubic Bezier geometry into ordered toolpath primitives:
//! - [`CubicSegment`] evaluation, splitting and arc length
//! - [`BiarcFitter`] approximating segments by arcs and lines
//! - [`PathNormalizer`] flattening subpaths into [`Path`]s
//! - [`order_paths`] reducing pen-up travel between paths

pub mod bezier;
pub mod biarc;
pub mod normalize;
pub mod order;
pub mod primitive;
pub mod stats;

pub use bezier::{CubicSegment, LENGTH_TOLERANCE};
pub use biarc::{BiarcFitter, FitTolerance, FittedPrimitive};
pub use normalize::{PathNormalizer, Subpath};
pub use order::{order_paths, travel_distance};
pub use primitive::{Path, Primitive};
pub use stats::FitStats;
