//! Registry configuration module.

use super::{ConfigResult, Validate};
use crate::error::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the component registry is read from at boot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Root of the component definition tree
    pub component_root: PathBuf,

    /// Directory holding `<kind>.config.json` mappings and the method table
    pub mapping_dir: PathBuf,

    /// File name of the method table inside `mapping_dir`
    pub method_table: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            component_root: PathBuf::from("components"),
            mapping_dir: PathBuf::from("config/mapping"),
            method_table: "restful.json".to_string(),
        }
    }
}

impl Validate for RegistryConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.component_root.as_os_str().is_empty() || self.mapping_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "component_root and mapping_dir cannot be empty".to_string(),
            ));
        }

        if self.method_table.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "method_table cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
