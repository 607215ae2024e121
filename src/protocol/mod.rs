// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! REST protocol module.
//!
//! This module implements the request pipeline of the gateway: envelope
//! classification, token authentication, method resolution and invocation, and
//! response wrapping, together with the error catalog they all report through.

pub mod auth;
pub mod catalog;
pub mod classifier;
pub mod dispatcher;
pub mod envelope;
pub mod formatter;
pub mod handler;

pub use auth::Authenticator;
pub use catalog::{ErrorEntry, ErrorKey};
pub use classifier::{Classifier, Rejection};
pub use dispatcher::{resolve, Dispatcher};
pub use envelope::{HttpMethod, Params, RawRequest, RequestEnvelope, WireFormat};
pub use formatter::{wrap, wrap_error, FormattedResponse, Reply};
pub use handler::{handler_fn, HandlerError, MethodContext, MethodHandler, MethodHandlerFn, MethodResult};
