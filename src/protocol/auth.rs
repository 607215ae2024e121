// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Token authentication.
//!
//! Plain membership of the caller's token in the configured allow-list. With an
//! empty allow-list the check is a no-op.

use std::collections::HashSet;

use http::{HeaderMap, HeaderName};

use super::catalog::ErrorKey;
use crate::config::security::SecurityConfig;

/// Validates the access token header against an allow-list.
#[derive(Debug, Clone)]
pub struct Authenticator {
    header: HeaderName,
    tokens: HashSet<String>,
}

impl Authenticator {
    /// Creates an authenticator from the security configuration.
    ///
    /// An invalid header name falls back to `x-access-token`; configuration
    /// validation rejects such names before this point.
    pub fn new(config: &SecurityConfig) -> Self {
        let header = HeaderName::from_bytes(config.token_header.as_bytes())
            .unwrap_or_else(|_| HeaderName::from_static("x-access-token"));
        Self {
            header,
            tokens: config.access_tokens.iter().cloned().collect(),
        }
    }

    /// Whether an allow-list is configured.
    pub fn is_enabled(&self) -> bool {
        !self.tokens.is_empty()
    }

    /// Checks the request headers.
    ///
    /// Header names are case-insensitive. An empty header counts as missing; a
    /// value that is not valid visible ASCII is treated as an invalid token.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<(), ErrorKey> {
        if !self.is_enabled() {
            return Ok(());
        }

        let value = match headers.get(&self.header) {
            Some(value) if !value.is_empty() => value,
            _ => return Err(ErrorKey::MissingToken),
        };

        match value.to_str() {
            Ok(token) if self.tokens.contains(token) => Ok(()),
            _ => Err(ErrorKey::InvalidToken),
        }
    }
}
