//! Error handling for Plotkit
//!
//! Provides the error types for every stage of the compiler:
//! - Geometry errors (biarc solve failures, degenerate segments)
//! - Compile errors (configuration and input problems)
//!
//! Geometry errors are recovered inside the fitter and never reach callers
//! under a valid configuration. They are still typed so the recovery paths
//! can be logged and tested.

use thiserror::Error;

/// Geometry error type
///
/// Raised while fitting arcs to a cubic segment. Every variant has a local
/// recovery: a straight-line fallback or a forced subdivision.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Zero-length chord, collapsed helper point or an arc centre that is
    /// not representable
    #[error("Degenerate geometry: {reason}")]
    DegenerateGeometry {
        /// What made the geometry degenerate.
        reason: String,
    },

    /// The biarc quadratic has no real roots
    #[error("Biarc quadratic has negative discriminant {discriminant}")]
    NegativeDiscriminant {
        /// The computed discriminant.
        discriminant: f64,
    },

    /// Both roots of the biarc quadratic have the same sign
    #[error("Biarc roots share a sign: {beta1} and {beta2}")]
    BiarcDegenerate {
        /// The first root.
        beta1: f64,
        /// The second root.
        beta2: f64,
    },

    /// Both the quadratic and linear coefficients vanish
    #[error("Biarc quadratic is underdetermined")]
    Underdetermined,

    /// Tolerance was not met before the split depth ran out
    #[error("Biarc tolerance not met at maximum split depth {depth}")]
    RecursionLimitReached {
        /// The depth at which the fitter gave up.
        depth: u32,
    },
}

/// Compile error type
///
/// Represents problems with the configuration or with the paths handed to
/// the compiler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A path with no primitives reached the orderer or the emitter
    #[error("Path '{id}' has no drawable primitives")]
    EmptyPath {
        /// The identifier of the skipped path.
        id: String,
    },

    /// The transform is singular or not finite
    #[error("Invalid transform: {reason}")]
    InvalidTransform {
        /// Why the transform was rejected.
        reason: String,
    },

    /// A tolerance value is out of range
    #[error("Invalid tolerance '{name}': {reason}")]
    InvalidTolerance {
        /// The tolerance name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}
