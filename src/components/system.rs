// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Introspection of the declared method table.

use std::any::Any;
use std::sync::Arc;

use serde_json::json;

use crate::protocol::formatter::Reply;
use crate::protocol::handler::{handler_fn, MethodHandlerFn, MethodResult};
use crate::registry::{Component, HandlerBinding};

/// Lists the method bindings the gateway was booted with.
#[derive(Debug, Clone)]
pub struct SystemController {
    bindings: Arc<Vec<HandlerBinding>>,
}

impl SystemController {
    /// Creates the controller over a snapshot of the method table.
    pub fn new(bindings: Vec<HandlerBinding>) -> Self {
        Self {
            bindings: Arc::new(bindings),
        }
    }

    /// `{"total": n, "methods": [...]}`, sorted by namespace, version and leaf.
    pub fn methods(&self) -> MethodResult {
        Ok(Reply::Value(json!({
            "total": self.bindings.len(),
            "methods": self.bindings.as_slice(),
        })))
    }
}

impl Component for SystemController {
    fn exports(self: Arc<Self>) -> Vec<(&'static str, MethodHandlerFn)> {
        vec![(
            "methods",
            handler_fn(move |_context, _params| {
                let result = self.methods();
                async move { result }
            }),
        )]
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
