// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! HTTP transport.
//!
//! A plain HTTP/1.1 listener that collects each request, hands it to the
//! [`Dispatcher`](crate::protocol::Dispatcher) and writes back the formatted body.
//! Application-level errors are always answered with status 200 and a catalog
//! envelope.

pub mod server;

pub use server::{bind_with_fallback, build_response, RestServer};
