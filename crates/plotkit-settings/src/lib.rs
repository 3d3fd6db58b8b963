//! Plotkit Settings Crate
//!
//! Handles configuration loading, saving and validation, and converts the
//! persisted settings into the runtime configuration of the pipeline.

pub mod config;
pub mod error;

pub use config::{
    Config, InputUnits, MachineSettings, OutputSettings, TransformSettings, MAX_SPLIT_DEPTH_LIMIT,
};
pub use error::{ConfigError, SettingsError, SettingsResult};
