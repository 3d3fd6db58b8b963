//! # Plotkit Core
//!
//! Core types shared by every Plotkit crate:
//! - [`Point`] vector algebra in the drawing plane
//! - [`Transform`] mapping document coordinates to machine coordinates
//! - [`BoundingBox`] extents accumulated over emitted commands
//! - Unit handling and coordinate formatting
//! - Error types

pub mod bounds;
pub mod error;
pub mod geometry;
pub mod transform;
pub mod units;

pub use bounds::BoundingBox;
pub use error::{CompileError, GeometryError};
pub use geometry::{Point, STRAIGHT_DISTANCE_TOLERANCE, STRAIGHT_TOLERANCE};
pub use transform::{AxisOrigin, Transform};
pub use units::{format_coordinate, get_unit_label, round_coordinate, MeasurementSystem};
