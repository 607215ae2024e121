//! REST endpoint configuration module.

use super::{ConfigResult, Validate};
use crate::error::config::ConfigError;
use serde::{Deserialize, Serialize};

/// REST endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    /// Path prefix every request must start with
    pub prefix: String,

    /// Version forced by path-style shorthand requests
    pub shorthand_version: String,

    /// Format forced by path-style shorthand requests
    pub shorthand_format: String,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            prefix: "/router/rest".to_string(),
            shorthand_version: "1.0".to_string(),
            shorthand_format: "json".to_string(),
        }
    }
}

impl Validate for RestConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !self.prefix.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "REST prefix must start with '/': {}",
                self.prefix
            )));
        }

        if self.prefix.len() > 1 && self.prefix.ends_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "REST prefix must not end with '/': {}",
                self.prefix
            )));
        }

        if self.shorthand_version.trim().is_empty() || self.shorthand_format.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "shorthand version and format cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
