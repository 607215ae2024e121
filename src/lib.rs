//! Lanai REST Gateway Library
//!
//! This library contains the core components of the Lanai REST gateway: a single
//! HTTP endpoint through which callers invoke named, versioned methods and receive
//! the result as JSON, XML or a raw binary payload.
//!
//! # Architecture
//!
//! A request flows through the [`protocol`] pipeline:
//! classifier → authenticator → resolver → handler → formatter.
//! The handlers come from components assembled once at boot by the [`registry`];
//! the resulting index is immutable and shared by every request.
//!
//! - [`config`]: layered configuration (defaults, file, `LANAI__*` environment)
//! - [`error`]: internal error types and error reporting
//! - [`protocol`]: envelope, catalog, dispatch and wire formats
//! - [`registry`]: component discovery, name mappings and method binding
//! - [`render`]: the document rendering side channel
//! - [`components`]: built-in components
//! - [`transport`]: the HTTP listener

pub mod components;
pub mod config;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod render;
pub mod transport;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;

use std::sync::Arc;

use config::LanaiConfig;
use error::LanaiResult;
use protocol::Dispatcher;
use render::CommandRenderer;

/// Version information for the Lanai REST gateway.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds the component registry and the dispatcher serving it.
///
/// Runs synchronously; a registry failure is returned and the gateway must not
/// start serving.
pub fn boot(config: &LanaiConfig) -> LanaiResult<Dispatcher> {
    let renderer = Arc::new(CommandRenderer::from_config(&config.render));
    let factories = components::standard_factories(renderer);
    let index = registry::build(&config.registry, &factories)?;
    Ok(Dispatcher::from_config(config, Arc::new(index)))
}
