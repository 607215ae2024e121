//! Transport error module.
//!
//! This module defines error types that may occur in the HTTP transport.

use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors that can occur during transport operations.
#[derive(Error, Debug)]
pub enum TransportError {
    /// No port could be bound, even after probing successive ports.
    #[error("Failed to bind {address} after {attempts} attempt(s): {source}")]
    Bind {
        /// First address tried
        address: SocketAddr,
        /// Number of ports probed
        attempts: u16,
        /// Last bind error
        #[source]
        source: io::Error,
    },

    /// Error when accepting a connection.
    #[error("Accept error: {0}")]
    Accept(#[from] io::Error),

    /// Error when reading the request body.
    #[error("Failed to read request body: {0}")]
    Body(String),

    /// Error when the request body exceeds the configured limit.
    #[error("Request body exceeds {0} bytes")]
    BodyTooLarge(usize),
}
