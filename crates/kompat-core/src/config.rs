//! Configuration schema (kompat.toml)

use crate::condition::Impact;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default number of checks evaluated concurrently
pub const DEFAULT_CONCURRENCY: usize = 4;

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

/// Impact overrides for specific checks
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImpactOverrides {
    /// Map of check ID to impact override
    #[serde(default)]
    pub overrides: HashMap<String, Impact>,
}

impl ImpactOverrides {
    /// Impact override for a check, if any
    pub fn get(&self, check_id: &str) -> Option<Impact> {
        self.overrides.get(check_id).copied()
    }

    /// Set impact override for a check
    pub fn set_override(&mut self, check_id: impl Into<String>, impact: Impact) {
        self.overrides.insert(check_id.into(), impact);
    }
}

/// Which checks to run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CheckRules {
    /// Completely skip these checks (glob patterns over check IDs)
    #[serde(default)]
    pub skip: Vec<String>,
}

impl CheckRules {
    /// Check if a check ID matches any skip pattern
    pub fn is_skipped(&self, check_id: &str) -> bool {
        self.skip.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, check_id)
            } else {
                pattern == check_id
            }
        })
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Version to check the installation against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_version: Option<Version>,

    /// Maximum number of checks evaluated at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Check selection
    #[serde(default)]
    pub checks: CheckRules,

    /// Impact overrides
    #[serde(default)]
    pub impact: ImpactOverrides,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_version: None,
            concurrency: DEFAULT_CONCURRENCY,
            checks: CheckRules::default(),
            impact: ImpactOverrides::default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Simple glob matching (single * wildcard)
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" || pattern == "**" {
        return true;
    }

    if let Some(star_pos) = pattern.find('*') {
        let prefix = &pattern[..star_pos];
        let suffix = &pattern[star_pos + 1..];

        text.len() >= prefix.len() + suffix.len()
            && text.starts_with(prefix)
            && text.ends_with(suffix)
    } else {
        pattern == text
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
