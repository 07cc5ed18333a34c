#![forbid(unsafe_code)]

//! Engine configuration.
//!
//! Every field is optional in the JSON form; missing sections fall back to
//! their defaults, so a file only needs to name what it overrides:
//!
//! ```json
//! { "anomaly": { "consonant_ratio": 0.8 }, "age": { "method": "julian_years" } }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::age::AgeConfig;
use crate::anomaly::AnomalyConfig;
use crate::blacklist::BlacklistExtras;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error loading an [`EngineConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The contents are not a valid configuration.
    Parse(serde_json::Error),
    /// Parsed, but the values are inconsistent.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Tunables for the validation engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub anomaly: AnomalyConfig,
    pub age: AgeConfig,
    pub blacklist: BlacklistExtras,
}

impl EngineConfig {
    #[must_use]
    pub fn with_anomaly(mut self, anomaly: AnomalyConfig) -> Self {
        self.anomaly = anomaly;
        self
    }

    #[must_use]
    pub fn with_age(mut self, age: AgeConfig) -> Self {
        self.age = age;
        self
    }

    #[must_use]
    pub fn with_blacklist(mut self, blacklist: BlacklistExtras) -> Self {
        self.blacklist = blacklist;
        self
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        info!(path = %path.display(), "engine config loaded");
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        let ratio = self.anomaly.consonant_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::Invalid(format!(
                "anomaly.consonant_ratio must be within 0..=1, got {ratio}"
            )));
        }
        if self.anomaly.digit_run_threshold == 0 {
            return Err(ConfigError::Invalid(
                "anomaly.digit_run_threshold must be positive".to_string(),
            ));
        }
        if self.age.min_age > self.age.adult_age {
            return Err(ConfigError::Invalid(format!(
                "age.min_age ({}) exceeds age.adult_age ({})",
                self.age.min_age, self.age.adult_age
            )));
        }
        Ok(())
    }
}
