//! Configuration for the box joint companion
//!
//! Configuration is organized into sections:
//! - Machine parameters fed to the move calculator
//! - Serial connection settings
//! - Random pattern generator defaults
//!
//! Files are JSON or TOML, chosen by extension. Missing sections and keys
//! fall back to defaults. Settings are read-only here; edits made during a
//! session are not written back.

use crate::error::{SettingsError, SettingsResult};
use boxjoint_camtools::{
    validate_smoothness, MoveCalculator, PatternGeneratorParameters, DEFAULT_KERF,
    DEFAULT_SMOOTHNESS, DEFAULT_TOLERANCE,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Machine parameters (thou, except smoothness)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Blade width removed by one pass
    pub kerf: Option<i32>,
    /// Slack subtracted from fingers and added to gaps
    pub tolerance: Option<i32>,
    /// Fraction of kerf used as the gap sub-cut step, in (0, 1)
    pub smoothness: Option<f64>,
    /// Width of the stock being cut
    pub stock_width: Option<i32>,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            kerf: Some(DEFAULT_KERF),
            tolerance: Some(DEFAULT_TOLERANCE),
            smoothness: Some(DEFAULT_SMOOTHNESS),
            stock_width: Some(3000),
        }
    }
}

impl MachineSettings {
    /// Copy every parameter, set or unset, into a calculator
    pub fn apply_to(&self, calculator: &mut MoveCalculator) {
        calculator.configure(self.kerf, self.tolerance, self.smoothness, self.stock_width);
    }

    /// Build a calculator holding these parameters
    pub fn to_calculator(&self) -> MoveCalculator {
        let mut calculator = MoveCalculator::unconfigured();
        self.apply_to(&mut calculator);
        calculator
    }

    fn validate(&self) -> SettingsResult<()> {
        if let Some(kerf) = self.kerf {
            if kerf <= 0 {
                return Err(SettingsError::invalid("machine.kerf", "must be > 0"));
            }
        }
        if let Some(smoothness) = self.smoothness {
            validate_smoothness(smoothness)
                .map_err(|e| SettingsError::invalid("machine.smoothness", e.to_string()))?;
        }
        if let Some(stock_width) = self.stock_width {
            if stock_width < 0 {
                return Err(SettingsError::invalid(
                    "machine.stock_width",
                    "must not be negative",
                ));
            }
        }
        Ok(())
    }
}

/// Serial connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Port or paired device to connect to (e.g. "/dev/rfcomm0")
    pub device: Option<String>,
    /// Baud rate
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            device: None,
            baud_rate: 9600,
            timeout_ms: 10,
        }
    }
}

/// Random pattern generator defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub min_width: i32,
    pub max_width: i32,
    pub pair_count: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            min_width: 150,
            max_width: 600,
            pair_count: 5,
        }
    }
}

impl GeneratorSettings {
    pub fn to_parameters(&self) -> PatternGeneratorParameters {
        PatternGeneratorParameters {
            min_width: self.min_width,
            max_width: self.max_width,
            pair_count: self.pair_count,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Move calculator parameters
    pub machine: MachineSettings,
    /// Serial connection
    pub connection: ConnectionSettings,
    /// Random pattern generator
    pub generator: GeneratorSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config location, e.g. `~/.config/boxjoint/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("boxjoint").join("config.toml"))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::LoadError {
            path: path.display().to_string(),
            source,
        })?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(SettingsError::UnsupportedFormat(
                path.display().to_string(),
            ));
        };

        config.validate()?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Load an explicit file, else the default file if present, else
    /// defaults
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Some(default) if default.is_file() => Self::load_from_file(&default),
            _ => Ok(Self::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.machine.validate()?;

        if self.connection.baud_rate == 0 {
            return Err(SettingsError::invalid("connection.baud_rate", "must be > 0"));
        }
        if self.connection.timeout_ms == 0 {
            return Err(SettingsError::invalid("connection.timeout_ms", "must be > 0"));
        }

        if self.generator.min_width < 0 {
            return Err(SettingsError::invalid(
                "generator.min_width",
                "must not be negative",
            ));
        }
        if self.generator.min_width > self.generator.max_width {
            return Err(SettingsError::invalid(
                "generator.max_width",
                format!(
                    "{} is less than min_width {}",
                    self.generator.max_width, self.generator.min_width
                ),
            ));
        }

        Ok(())
    }
}
