//! Security configuration module.
//!
//! Token allow-list used by the authenticator.

use super::{ConfigResult, Validate};
use crate::error::config::ConfigError;
use http::HeaderName;
use serde::{Deserialize, Serialize};

/// Security configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Accepted access tokens; an empty list disables authentication
    pub access_tokens: Vec<String>,

    /// Header carrying the caller's token (matched case-insensitively)
    pub token_header: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            access_tokens: Vec::new(),
            token_header: "X-Access-Token".to_string(),
        }
    }
}

impl Validate for SecurityConfig {
    fn validate(&self) -> ConfigResult<()> {
        if HeaderName::from_bytes(self.token_header.as_bytes()).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "Invalid token_header: {}",
                self.token_header
            )));
        }

        if self.access_tokens.iter().any(|token| token.is_empty()) {
            return Err(ConfigError::ValidationError(
                "access_tokens cannot contain empty tokens".to_string(),
            ));
        }

        Ok(())
    }
}
