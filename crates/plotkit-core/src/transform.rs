//! Document-to-machine coordinate transform.
//!
//! Every emitted coordinate goes through one [`Transform`]:
//!
//! ```text
//! x' = unit_scale * (x * scale_x + offset_x)
//! y' = unit_scale * (±y * scale_y + offset_y + y_shift)
//! ```
//!
//! The sign of `y` is negative when the Y axis is flipped. Arc offsets
//! (`I`/`J`) only use the linear part. A transform whose X and Y factors have
//! opposite signs mirrors the drawing, which reverses arc winding.

use crate::error::CompileError;
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Where the machine origin sits relative to the document page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AxisOrigin {
    /// Origin at the top-left corner of the page
    #[default]
    TopLeft,
    /// Origin at the bottom-left corner; Y is shifted by the page height
    BottomLeft,
}

impl std::fmt::Display for AxisOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TopLeft => write!(f, "top-left"),
            Self::BottomLeft => write!(f, "bottom-left"),
        }
    }
}

/// Uniform scale/offset/flip applied to every emitted coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    scale_x: f64,
    scale_y: f64,
    offset_x: f64,
    offset_y: f64,
    flip_y: bool,
    y_shift: f64,
    unit_scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity transform.
    pub const fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            flip_y: false,
            y_shift: 0.0,
            unit_scale: 1.0,
        }
    }

    /// Creates a transform, rejecting zero or non-finite scale factors.
    pub fn new(
        scale_x: f64,
        scale_y: f64,
        offset_x: f64,
        offset_y: f64,
    ) -> Result<Self, CompileError> {
        let transform = Self {
            scale_x,
            scale_y,
            offset_x,
            offset_y,
            ..Self::identity()
        };
        transform.validate()?;
        Ok(transform)
    }

    /// Flips the Y axis.
    pub fn with_flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }

    /// Sets the document-to-output unit factor.
    pub fn with_unit_scale(mut self, unit_scale: f64) -> Result<Self, CompileError> {
        self.unit_scale = unit_scale;
        self.validate()?;
        Ok(self)
    }

    /// Places the origin. Both conventions flip Y; bottom-left also shifts Y
    /// by the page height.
    ///
    /// Top-left input must already be in the host's flipped frame, with Y
    /// growing downward from the top edge.
    pub fn with_origin(mut self, origin: AxisOrigin, page_height: f64) -> Result<Self, CompileError> {
        self.flip_y = true;
        self.y_shift = match origin {
            AxisOrigin::TopLeft => 0.0,
            AxisOrigin::BottomLeft => page_height,
        };
        self.validate()?;
        Ok(self)
    }

    /// Checks that the transform is invertible and finite.
    pub fn validate(&self) -> Result<(), CompileError> {
        let invalid = |reason: &str| CompileError::InvalidTransform {
            reason: reason.to_string(),
        };

        if !self.scale_x.is_finite() || self.scale_x == 0.0 {
            return Err(invalid("scale_x must be finite and non-zero"));
        }
        if !self.scale_y.is_finite() || self.scale_y == 0.0 {
            return Err(invalid("scale_y must be finite and non-zero"));
        }
        if !self.unit_scale.is_finite() || self.unit_scale <= 0.0 {
            return Err(invalid("unit_scale must be finite and positive"));
        }
        if !self.offset_x.is_finite() || !self.offset_y.is_finite() || !self.y_shift.is_finite() {
            return Err(invalid("offsets must be finite"));
        }
        Ok(())
    }

    /// Net Y multiplier including the flip.
    fn y_factor(&self) -> f64 {
        if self.flip_y {
            -self.scale_y
        } else {
            self.scale_y
        }
    }

    /// Maps a document point to machine coordinates.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.unit_scale * (p.x * self.scale_x + self.offset_x),
            self.unit_scale * (p.y * self.y_factor() + self.offset_y + self.y_shift),
        )
    }

    /// Maps a free vector (no offsets), used for arc centre offsets.
    pub fn apply_vector(&self, v: Point) -> Point {
        Point::new(
            self.unit_scale * v.x * self.scale_x,
            self.unit_scale * v.y * self.y_factor(),
        )
    }

    /// Scales a document length along X, used for explicit arc radii.
    pub fn scale_length(&self, length: f64) -> f64 {
        self.unit_scale * length * self.scale_x.abs()
    }

    /// True when the transform has odd parity and reverses arc winding.
    pub fn is_mirrored(&self) -> bool {
        self.scale_x * self.y_factor() < 0.0
    }

    /// The same transform with the Y scale negated, for the back side of a
    /// double-sided job.
    pub fn mirrored_y(&self) -> Self {
        Self {
            scale_y: -self.scale_y,
            y_shift: 0.0,
            ..*self
        }
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    pub fn unit_scale(&self) -> f64 {
        self.unit_scale
    }

    pub fn flip_y(&self) -> bool {
        self.flip_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_noop() {
        let t = Transform::identity();
        let p = Point::new(3.5, -2.0);
        assert_eq!(t.apply(p), p);
        assert!(!t.is_mirrored());
    }

    #[test]
    fn test_zero_scale_rejected() {
        assert!(matches!(
            Transform::new(0.0, 1.0, 0.0, 0.0),
            Err(CompileError::InvalidTransform { .. })
        ));
        assert!(Transform::new(1.0, 0.0, 0.0, 0.0).is_err());
        assert!(Transform::new(f64::NAN, 1.0, 0.0, 0.0).is_err());
        assert!(Transform::identity().with_unit_scale(0.0).is_err());
    }

    #[test]
    fn test_scale_and_offset() {
        let t = Transform::new(2.0, 3.0, 10.0, 20.0).unwrap();
        assert_eq!(t.apply(Point::new(1.0, 1.0)), Point::new(12.0, 23.0));
        assert_eq!(t.apply_vector(Point::new(1.0, 1.0)), Point::new(2.0, 3.0));
    }

    #[test]
    fn test_flip_makes_mirror() {
        let t = Transform::identity().with_flip_y(true);
        assert!(t.is_mirrored());
        assert_eq!(t.apply(Point::new(1.0, 2.0)), Point::new(1.0, -2.0));

        // Flipping an already negative Y scale cancels out
        let t = Transform::new(1.0, -1.0, 0.0, 0.0).unwrap().with_flip_y(true);
        assert!(!t.is_mirrored());
    }

    #[test]
    fn test_bottom_left_origin_shifts_by_page_height() {
        let t = Transform::identity()
            .with_origin(AxisOrigin::BottomLeft, 100.0)
            .unwrap();
        assert_eq!(t.apply(Point::new(5.0, 30.0)), Point::new(5.0, 70.0));
    }

    #[test]
    fn test_top_left_origin_flips_host_frame() {
        let t = Transform::identity()
            .with_origin(AxisOrigin::TopLeft, 100.0)
            .unwrap();
        assert!(t.is_mirrored());
        // A point 30 below the top edge lands 30 below the machine origin
        assert_eq!(t.apply(Point::new(5.0, 30.0)), Point::new(5.0, -30.0));
    }

    #[test]
    fn test_mirrored_y_inverts_parity() {
        let t = Transform::identity().with_flip_y(true);
        assert!(t.is_mirrored());
        assert!(!t.mirrored_y().is_mirrored());
    }

    #[test]
    fn test_unit_scale_applies_to_everything() {
        let t = Transform::new(1.0, 1.0, 10.0, 0.0)
            .unwrap()
            .with_unit_scale(0.5)
            .unwrap();
        assert_eq!(t.apply(Point::new(10.0, 4.0)), Point::new(10.0, 2.0));
        assert_eq!(t.scale_length(4.0), 2.0);
    }
}
