//! Configuration management for millpath
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats; the default file lives in the platform-specific
//! configuration directory.
//!
//! Configuration is organized into logical sections:
//! - Tool settings (cutter radius)
//! - Machine settings (depth stepping, drift, controller speeds, line budget)
//! - Strategy settings (walker weighting)

use crate::error::{SettingsError, SettingsResult};
use millpath_core::{DriftCompensation, SpeedProfile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "millpath.toml";

/// Cutter settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Tool radius in pixels (one pixel is 0.1 mm on the reference machine)
    pub radius: i32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self { radius: 18 }
    }
}

/// Machine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Depth added per input image
    pub depth_step: i32,
    /// Largest single Z move
    pub z_increment: i32,
    /// Upward overshoot after each downward Z move
    pub backlash: i32,
    /// Longest command line the controller accepts
    pub line_budget: usize,
    /// X skew per unit of depth
    pub drift: DriftCompensation,
    /// Speed pair used while moving Z
    pub plunge: SpeedProfile,
    /// Speed pair for XY milling
    pub cruise: SpeedProfile,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            depth_step: 10,
            z_increment: 5,
            backlash: 2,
            line_budget: 254,
            drift: DriftCompensation::default(),
            plunge: SpeedProfile::plunge(),
            cruise: SpeedProfile::cruise(),
        }
    }
}

/// Carving strategy settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    /// Walker score multiplier for N, S, E and W steps
    pub orthogonal_weight: i32,
    /// Walker score multiplier for centers next to the silhouette
    pub target_proximity_factor: i32,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            orthogonal_weight: 2,
            target_proximity_factor: 2,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub tool: ToolSettings,
    pub machine: MachineSettings,
    pub strategy: StrategySettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;
        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };
        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load `path` if given, else the default file if it exists, else
    /// the built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match default_config_path() {
            Ok(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        // Validate tool settings
        if self.tool.radius < 1 {
            return Err(SettingsError::invalid("tool.radius", "must be at least 1"));
        }

        // Validate machine settings
        if self.machine.depth_step < 1 {
            return Err(SettingsError::invalid(
                "machine.depth_step",
                "must be at least 1",
            ));
        }
        if self.machine.z_increment < 1 {
            return Err(SettingsError::invalid(
                "machine.z_increment",
                "must be at least 1",
            ));
        }
        if self.machine.backlash < 0 || self.machine.backlash > self.machine.z_increment {
            return Err(SettingsError::invalid(
                "machine.backlash",
                "must be between 0 and z_increment",
            ));
        }
        if self.machine.drift.denominator <= 0 {
            return Err(SettingsError::invalid(
                "machine.drift.denominator",
                "must be > 0",
            ));
        }
        // The longest position sync header needs about 40 bytes.
        if self.machine.line_budget < 64 {
            return Err(SettingsError::invalid(
                "machine.line_budget",
                "must be at least 64",
            ));
        }

        // Validate strategy settings
        if self.strategy.orthogonal_weight < 1 {
            return Err(SettingsError::invalid(
                "strategy.orthogonal_weight",
                "must be at least 1",
            ));
        }
        if self.strategy.target_proximity_factor < 1 {
            return Err(SettingsError::invalid(
                "strategy.target_proximity_factor",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}

/// Path of the configuration file in the platform config directory
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("millpath").join(CONFIG_FILE_NAME))
        .ok_or_else(|| {
            SettingsError::ConfigDirectory("no configuration directory on this platform".into())
        })
}
