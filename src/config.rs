//! Configuration for the report viewer.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tables::{CodeBook, CodeBookError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub radial: RadialConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    /// Code book YAML; the standard tables apply when unset.
    #[serde(default)]
    pub codebook: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Geometry of the radial mineral charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialConfig {
    #[serde(default = "default_base_radius")]
    pub base_radius: f64,
    #[serde(default = "default_radius_step")]
    pub radius_step: f64,
    /// Direction the charts are centred on, in degrees.
    #[serde(default = "default_anchor_deg")]
    pub anchor_deg: f64,
}

fn default_base_radius() -> f64 {
    1.0
}

fn default_radius_step() -> f64 {
    0.25
}

fn default_anchor_deg() -> f64 {
    90.0
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            base_radius: default_base_radius(),
            radius_step: default_radius_step(),
            anchor_deg: default_anchor_deg(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("snapshots")
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error(transparent)]
    CodeBook(#[from] CodeBookError),
}

impl AppConfig {
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn to_yaml(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    pub fn load_codebook(&self) -> Result<CodeBook, ConfigError> {
        match &self.codebook {
            Some(path) => Ok(CodeBook::load(path)?),
            None => Ok(CodeBook::standard().clone()),
        }
    }
}
