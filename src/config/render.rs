//! Renderer configuration module.
//!
//! The headless browser lives outside this process; these settings describe how
//! to reach it.

use super::{ConfigResult, Validate};
use crate::error::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// External renderer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Renderer executable; rendering methods fail when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<PathBuf>,

    /// Extra arguments passed to the renderer
    pub args: Vec<String>,

    /// Upper bound on a single render, in milliseconds
    pub timeout_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            program: None,
            args: Vec::new(),
            timeout_ms: 60_000,
        }
    }
}

impl Validate for RenderConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "render timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
