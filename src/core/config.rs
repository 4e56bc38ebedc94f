//! `specgate.toml` configuration.
//!
//! Every key is optional; a missing file means defaults.

use crate::core::constitution::Severity;
use crate::core::detectors::DetectorSettings;
use crate::core::error::SpecgateError;
use crate::core::parser::ParserOptions;
use crate::core::validator::ScoringWeights;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "specgate.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ParserConfig {
    pub default_severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub max_responsibilities: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_responsibilities: DetectorSettings::default().max_responsibilities,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SpecgateConfig {
    pub parser: ParserConfig,
    pub scoring: ScoringWeights,
    pub detectors: DetectorConfig,
}

impl SpecgateConfig {
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            default_severity: self.parser.default_severity,
        }
    }

    pub fn detector_settings(&self) -> DetectorSettings {
        DetectorSettings {
            max_responsibilities: self.detectors.max_responsibilities,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SpecgateError> {
        toml::from_str(content).map_err(|e| SpecgateError::ConfigError(e.to_string()))
    }
}

/// Candidate config locations under `dir`, in lookup order.
pub fn config_candidates(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join(CONFIG_FILE_NAME),
        dir.join(".specgate").join("config.toml"),
    ]
}

/// Load config from `explicit` if given (it must exist), otherwise from the
/// first candidate under `dir`. No config file is not an error.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<SpecgateConfig, SpecgateError> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(SpecgateError::NotFound(format!(
                "config file {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path).map_err(SpecgateError::IoError)?;
        return SpecgateConfig::from_toml_str(&content);
    }

    for candidate in config_candidates(dir) {
        if candidate.exists() {
            let content = fs::read_to_string(&candidate).map_err(SpecgateError::IoError)?;
            return SpecgateConfig::from_toml_str(&content);
        }
    }

    Ok(SpecgateConfig::default())
}
