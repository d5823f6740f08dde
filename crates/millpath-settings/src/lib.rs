//! millpath Settings Crate
//!
//! Handles configuration files: loading, saving and validation.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, Config, MachineSettings, StrategySettings, ToolSettings,
    CONFIG_FILE_NAME,
};
pub use error::{SettingsError, SettingsResult};
