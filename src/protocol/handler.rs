// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Method handler abstraction.
//!
//! Components export named functions implementing [`MethodHandler`]; the registry
//! binds them to method identifiers and the dispatcher invokes them.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use http::HeaderMap;

use super::catalog::ErrorKey;
use super::envelope::{HttpMethod, Params, WireFormat};
use super::formatter::Reply;

/// Transport context handed to a method handler along with its parameters.
#[derive(Debug, Clone)]
pub struct MethodContext {
    /// Accepted transport verb
    pub http_method: HttpMethod,
    /// Method identifier being invoked
    pub method: String,
    /// Requested version
    pub version: String,
    /// Negotiated wire format
    pub format: WireFormat,
    /// Request headers
    pub headers: HeaderMap,
    /// Decoded query pairs, in order
    pub query: Vec<(String, String)>,
}

impl MethodContext {
    /// Minimal context for invoking a handler outside of a request.
    pub fn detached(method: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            http_method: HttpMethod::Get,
            method: method.into(),
            version: version.into(),
            format: WireFormat::Json,
            headers: HeaderMap::new(),
            query: Vec::new(),
        }
    }
}

/// Why a handler did not produce a reply.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A deliberate, caller-visible catalog error.
    #[error("{0}")]
    Catalog(ErrorKey),

    /// An unexpected failure; reported to operators, hidden from callers.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl From<ErrorKey> for HandlerError {
    fn from(key: ErrorKey) -> Self {
        Self::Catalog(key)
    }
}

/// Type alias for method handler response.
pub type MethodResult = Result<Reply, HandlerError>;

/// Type alias for method handler's future return type.
pub type MethodHandlerFuture = BoxFuture<'static, MethodResult>;

/// Type alias for shared method handlers.
pub type MethodHandlerFn = Arc<dyn MethodHandler + Send + Sync>;

/// Trait for method handlers to implement.
pub trait MethodHandler {
    /// Handle a method call asynchronously.
    ///
    /// # Parameters
    /// * `context` - Transport context of the call.
    /// * `params` - The parameters extracted from the request.
    fn handle(&self, context: MethodContext, params: Params) -> MethodHandlerFuture;
}

impl<F, Fut> MethodHandler for F
where
    F: Send + Sync + 'static + Fn(MethodContext, Params) -> Fut,
    Fut: Future<Output = MethodResult> + Send + 'static,
{
    fn handle(&self, context: MethodContext, params: Params) -> MethodHandlerFuture {
        Box::pin((self)(context, params))
    }
}

/// Wraps a closure into a shared handler.
pub fn handler_fn<F, Fut>(f: F) -> MethodHandlerFn
where
    F: Send + Sync + 'static + Fn(MethodContext, Params) -> Fut,
    Fut: Future<Output = MethodResult> + Send + 'static,
{
    Arc::new(f)
}
