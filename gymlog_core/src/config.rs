//! Configuration file support for gymlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/gymlog/config.toml`.

use crate::{Classification, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub progression: ProgressionConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Double-progression parameters
///
/// Increments and rounding are tunable rather than fixed; the defaults are
/// +5 kg for lower-body lifts, +2.5 kg for upper-body lifts, a 5% deload and
/// one-decimal rounding.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgressionConfig {
    #[serde(default = "default_lower_body_increment")]
    pub lower_body_increment: f64,

    #[serde(default = "default_upper_body_increment")]
    pub upper_body_increment: f64,

    #[serde(default = "default_deload_factor")]
    pub deload_factor: f64,

    #[serde(default = "default_rounding_step")]
    pub rounding_step: f64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            lower_body_increment: default_lower_body_increment(),
            upper_body_increment: default_upper_body_increment(),
            deload_factor: default_deload_factor(),
            rounding_step: default_rounding_step(),
        }
    }
}

impl ProgressionConfig {
    /// Weight increment for a classification (unclassified lifts use the upper-body step)
    pub fn increment_for(&self, classification: Option<Classification>) -> f64 {
        match classification {
            Some(Classification::LowerBody) => self.lower_body_increment,
            Some(Classification::UpperBody) | None => self.upper_body_increment,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(self.lower_body_increment) || !positive(self.upper_body_increment) {
            return Err(Error::Config(format!(
                "Increments must be positive (lower {}, upper {})",
                self.lower_body_increment, self.upper_body_increment
            )));
        }
        if !positive(self.deload_factor) || self.deload_factor > 1.0 {
            return Err(Error::Config(format!(
                "deload_factor must be in (0, 1], got {}",
                self.deload_factor
            )));
        }
        if !positive(self.rounding_step) {
            return Err(Error::Config(format!(
                "rounding_step must be positive, got {}",
                self.rounding_step
            )));
        }
        Ok(())
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("gymlog")
}

fn default_lower_body_increment() -> f64 {
    5.0
}

fn default_upper_body_increment() -> f64 {
    2.5
}

fn default_deload_factor() -> f64 {
    0.95
}

fn default_rounding_step() -> f64 {
    0.1
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.progression.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("gymlog").join("config.toml")
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
