//! Board file loading
//!
//! Reads `lightup.toml` from disk. Falls back to the embedded defaults if
//! the file does not exist.

use std::fmt;
use std::io;
use std::path::Path;

use serde::Deserialize;

use lightup_core::LightUpConfig;
use lightup_hal_sim::SimBoard;

/// Embedded default configuration (compiled into the binary)
pub const EMBEDDED_CONFIG: &str = include_str!("../lightup.toml");

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    /// File exists but could not be read
    Read(io::ErrorKind),
    /// TOML parsing failed
    TomlParse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(kind) => write!(f, "cannot read config file: {}", kind),
            ConfigError::TomlParse(e) => write!(f, "invalid config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::TomlParse(e)
    }
}

/// `[board]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Pins the board reports as GPIO-capable
    pub gpio: Vec<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            gpio: vec![
                lightup_core::config::DEFAULT_LED_PIN.to_string(),
                lightup_core::config::DEFAULT_BUTTON_PIN.to_string(),
            ],
        }
    }
}

impl BoardConfig {
    /// Build the simulated board this table describes
    pub fn build(&self) -> SimBoard {
        SimBoard::new(self.gpio.iter().map(String::as_str))
    }
}

/// Whole board file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub board: BoardConfig,
    pub app: LightUpConfig,
}

/// Parse a board file
pub fn parse_config(text: &str) -> Result<SimConfig, ConfigError> {
    Ok(toml::from_str(text)?)
}

/// Load the board file at `path`, or the embedded defaults if it is missing
pub fn load_config(path: &Path) -> Result<SimConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            log::info!("Loaded configuration from {}", path.display());
            parse_config(&text)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("{} not found, using embedded defaults", path.display());
            parse_config(EMBEDDED_CONFIG)
        }
        Err(e) => Err(ConfigError::Read(e.kind())),
    }
}
