//! Server configuration module.
//!
//! Listener address, port probing and request limits.

use super::ConfigResult;
use super::Validate;
use crate::error::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Name of the server (used in logs)
    pub name: String,

    /// Address to bind the HTTP listener to
    pub address: SocketAddr,

    /// How many successive ports to try when the configured one is taken
    pub port_fallback_attempts: u16,

    /// Number of worker threads for the async runtime
    pub worker_threads: usize,

    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "lanai-rest".to_string(),
            address: SocketAddr::from(([127, 0, 0, 1], 7001)),
            port_fallback_attempts: 10,
            worker_threads: num_cpus::get(),
            max_body_size: 500 * 1024,
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Server name cannot be empty".to_string(),
            ));
        }

        if self.worker_threads == 0 {
            return Err(ConfigError::ValidationError(
                "worker_threads must be greater than 0".to_string(),
            ));
        }

        if self.port_fallback_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "port_fallback_attempts must be greater than 0".to_string(),
            ));
        }

        if self.max_body_size == 0 {
            return Err(ConfigError::ValidationError(
                "max_body_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
