//! Runoff analysis configuration loader - parses runoff.toml
//!
//! Keeps unit system, sampling validation, worker count and input/output
//! folders out of the code, so a batch can be re-pointed or re-tuned without
//! recompiling. Every section is optional and falls back to its default.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::analysis::PipelineOptions;
use crate::analysis::runoff::DepthUnits;
use crate::ingest::rainfall::NCDC_MISSING_FLAG;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "runoff.toml";

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct RunoffConfig {
    pub units: UnitsConfig,
    pub sampling: SamplingConfig,
    pub batch: BatchConfig,
    pub unit_hydrograph: PipelineDirs,
    pub lag_time: PipelineDirs,
    pub rainfall: RainfallConfig,
}

/// Unit system of the tabulated inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    /// mi², cfs, inches
    #[default]
    UsCustomary,
    /// km², m³/s, millimetres
    Metric,
}

impl UnitSystem {
    pub fn depth_units(self) -> DepthUnits {
        match self {
            UnitSystem::UsCustomary => DepthUnits::US_CUSTOMARY,
            UnitSystem::Metric => DepthUnits::METRIC,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct UnitsConfig {
    pub system: UnitSystem,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Reject discharge series with irregular sampling intervals.
    pub validate_uniform: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            validate_uniform: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Thread pool size for per-event processing.
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// Input and output folders for one pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineDirs {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PipelineDirs {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("raw_data"),
            output_dir: PathBuf::from("results"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RainfallConfig {
    /// Station readings equal to this value are treated as missing.
    pub flag_value: f64,
}

impl Default for RainfallConfig {
    fn default() -> Self {
        Self {
            flag_value: NCDC_MISSING_FLAG,
        }
    }
}

impl RunoffConfig {
    /// Pipeline options derived from the units and sampling sections.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            units: self.units.system.depth_units(),
            validate_sampling: self.sampling.validate_uniform,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.workers == 0 {
            return Err(ConfigError::Invalid(
                "batch.workers must be at least 1".to_string(),
            ));
        }
        if !self.rainfall.flag_value.is_finite() {
            return Err(ConfigError::Invalid(
                "rainfall.flag_value must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Parses and validates configuration from TOML text.
pub fn parse_config(contents: &str, path: &Path) -> Result<RunoffConfig, ConfigError> {
    let config: RunoffConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from a runoff.toml file.
pub fn load_config(path: &Path) -> Result<RunoffConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_config(&contents, path)
}

/// Loads `path` if it exists, otherwise returns the defaults.
pub fn load_config_or_default(path: &Path) -> Result<RunoffConfig, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(RunoffConfig::default())
    }
}
