// Service configuration, loaded from the JSON the host passes at creation

use serde::Deserialize;
use smodr_core::{ControllerConfig, MediaError, Result};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Logcat tag on Android
    pub tag: String,
    /// Maximum level: off, error, warn, info, debug, trace
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            tag: "SmodrMedia".to_string(),
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        log::LevelFilter::from_str(&self.level)
            .map_err(|_| MediaError::Config(format!("unknown log level: {}", self.level)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub controller: ControllerConfig,
    pub log: LogConfig,
}

impl ServiceConfig {
    /// Parse and validate a config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ServiceConfig =
            serde_json::from_str(json).map_err(|e| MediaError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.controller.validate()?;
        self.log.level_filter()?;
        Ok(())
    }
}
