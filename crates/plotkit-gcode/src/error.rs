//! Error types for the G-code crate.
//!
//! Covers emitter configuration, job documents and command parsing.

use plotkit_core::CompileError;
use thiserror::Error;

/// Errors that can occur while compiling or post-processing G-code.
#[derive(Error, Debug)]
pub enum GcodeError {
    /// The transform or tolerances were rejected.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The emitter configuration is unusable.
    #[error("Invalid emitter configuration: {0}")]
    InvalidConfig(String),

    /// A command line could not be parsed.
    #[error("Invalid command '{line}': {reason}")]
    InvalidCommand { line: String, reason: String },

    /// The job document could not be read.
    #[error("Invalid job document: {0}")]
    InvalidJob(#[from] serde_json::Error),
}

/// Result type alias for G-code operations.
pub type GcodeResult<T> = Result<T, GcodeError>;
