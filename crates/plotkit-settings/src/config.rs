//! Configuration for Plotkit
//!
//! Persisted settings for the plotter pipeline, stored as JSON or TOML.
//!
//! Configuration is organized into sections:
//! - Fitting tolerances
//! - Document-to-machine transform (scale, offset, origin, input units)
//! - Machine settings (feeds, pen macros, travel threshold)
//! - Output settings (units, homing, banners, double-sided passes)

use crate::error::{ConfigError, SettingsError, SettingsResult};
use plotkit_core::{AxisOrigin, MeasurementSystem, Transform};
use plotkit_gcode::{CompileOptions, EmitterConfig, JobCompiler, ProgramOptions};
use plotkit_toolpath::FitTolerance;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Deepest split depth accepted from a config file; each level can double
/// the primitive count.
pub const MAX_SPLIT_DEPTH_LIMIT: u32 = 16;

/// Units of the incoming geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputUnits {
    /// Document pixels, scaled to the output units
    #[default]
    Pixels,
    /// Already in output units
    Native,
}

impl std::fmt::Display for InputUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pixels => write!(f, "pixels"),
            Self::Native => write!(f, "native"),
        }
    }
}

/// Transform settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Where the machine origin sits on the page
    pub origin: AxisOrigin,
    /// Page height in document units, used by the bottom-left origin
    pub page_height: f64,
    pub input_units: InputUnits,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            origin: AxisOrigin::TopLeft,
            page_height: 0.0,
            input_units: InputUnits::Pixels,
        }
    }
}

/// Machine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Cut feed rate in units/min
    pub cut_feed: u32,
    /// Travel feed rate in units/min
    pub travel_feed: u32,
    /// Moves up to this distance (document units) are skipped
    pub min_travel: f64,
    pub pen_up: Vec<String>,
    pub pen_down: Vec<String>,
    /// Tool loaded at program start
    pub starting_tool: u32,
}

impl Default for MachineSettings {
    fn default() -> Self {
        let emitter = EmitterConfig::default();
        Self {
            cut_feed: emitter.cut_feed,
            travel_feed: emitter.travel_feed,
            min_travel: emitter.min_travel,
            pen_up: emitter.pen_up,
            pen_down: emitter.pen_down,
            starting_tool: 0,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub units: MeasurementSystem,
    pub home_before: bool,
    pub home_after: bool,
    pub layer_banners: bool,
    /// Emit a mirrored back-side pass after a tool change
    pub double_sided: bool,
    /// Translate the program so its extents start at the origin
    pub normalize_origin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        let program = ProgramOptions::default();
        Self {
            units: program.units,
            home_before: program.home_before,
            home_after: program.home_after,
            layer_banners: program.layer_banners,
            double_sided: false,
            normalize_origin: false,
            header: None,
            footer: None,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub tolerance: FitTolerance,
    pub transform: TransformSettings,
    pub machine: MachineSettings,
    pub output: OutputSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-user config file location.
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| SettingsError::ConfigDirectory("no config or home directory".to_string()))?;
        Ok(dir.join("plotkit").join("config.toml"))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads the file when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.tolerance.validate()?;
        if self.tolerance.max_split_depth > MAX_SPLIT_DEPTH_LIMIT {
            return Err(ConfigError::ValueOutOfRange {
                key: "tolerance.max_split_depth".to_string(),
                value: self.tolerance.max_split_depth.to_string(),
            }
            .into());
        }

        if self.machine.cut_feed == 0 {
            return Err(invalid("machine.cut_feed", "must be > 0"));
        }
        if self.machine.travel_feed == 0 {
            return Err(invalid("machine.travel_feed", "must be > 0"));
        }
        if !self.transform.page_height.is_finite() || self.transform.page_height < 0.0 {
            return Err(invalid("transform.page_height", "must not be negative"));
        }
        if self.transform.origin == AxisOrigin::BottomLeft && self.transform.page_height == 0.0 {
            return Err(invalid(
                "transform.page_height",
                "is required for a bottom-left origin",
            ));
        }

        // Scales, offsets and pen macros are checked by their runtime types
        self.to_emitter_config()?.validate()?;
        Ok(())
    }

    /// Document-to-machine transform.
    pub fn to_transform(&self) -> SettingsResult<Transform> {
        let t = &self.transform;
        let unit_scale = match t.input_units {
            InputUnits::Pixels => self.output.units.px_scale(),
            InputUnits::Native => 1.0,
        };
        let transform = Transform::new(t.scale_x, t.scale_y, t.offset_x, t.offset_y)?
            .with_unit_scale(unit_scale)?
            .with_origin(t.origin, t.page_height)?;
        Ok(transform)
    }

    pub fn to_fit_tolerance(&self) -> FitTolerance {
        self.tolerance
    }

    pub fn to_emitter_config(&self) -> SettingsResult<EmitterConfig> {
        Ok(EmitterConfig {
            transform: self.to_transform()?,
            cut_feed: self.machine.cut_feed,
            travel_feed: self.machine.travel_feed,
            min_travel: self.machine.min_travel,
            min_arc_radius: self.tolerance.min_arc_radius,
            pen_up: self.machine.pen_up.clone(),
            pen_down: self.machine.pen_down.clone(),
        })
    }

    pub fn to_compile_options(&self) -> CompileOptions {
        CompileOptions {
            double_sided: self.output.double_sided,
            normalize_origin: self.output.normalize_origin,
        }
    }

    pub fn to_program_options(&self) -> ProgramOptions {
        ProgramOptions {
            header: self.output.header.clone(),
            footer: self.output.footer.clone(),
            units: self.output.units,
            home_before: self.output.home_before,
            home_after: self.output.home_after,
            layer_banners: self.output.layer_banners,
            starting_tool: self.machine.starting_tool,
        }
    }

    /// Builds a job compiler from these settings.
    pub fn compiler(&self) -> SettingsResult<JobCompiler> {
        Ok(JobCompiler::new(
            self.to_fit_tolerance(),
            self.to_emitter_config()?,
            self.to_compile_options(),
        )?)
    }
}

fn invalid(key: &str, reason: &str) -> SettingsError {
    SettingsError::InvalidSetting {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("none").to_string()).into()),
        }
    }
}
