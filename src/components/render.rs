// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Document rendering component pair.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::render::RenderError;
use crate::protocol::catalog::ErrorKey;
use crate::protocol::envelope::Params;
use crate::protocol::formatter::Reply;
use crate::protocol::handler::{handler_fn, HandlerError, MethodContext, MethodHandlerFn, MethodResult};
use crate::registry::Component;
use crate::render::{RenderOptions, Renderer};

/// Shared access to the renderer.
pub struct RenderService {
    renderer: Arc<dyn Renderer>,
}

impl RenderService {
    /// Wraps a renderer.
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self { renderer }
    }

    /// Renders a document.
    pub async fn render(&self, options: &RenderOptions) -> Result<Bytes, RenderError> {
        let started = std::time::Instant::now();
        let bytes = self.renderer.render(options).await?;
        tracing::debug!(
            output = %options.output,
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Document rendered"
        );
        Ok(bytes)
    }
}

impl fmt::Debug for RenderService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderService").finish_non_exhaustive()
    }
}

impl Component for RenderService {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Exposes `render` as a method target.
#[derive(Debug)]
pub struct RenderController {
    service: Arc<RenderService>,
}

impl RenderController {
    /// Creates the controller over its service.
    pub fn new(service: Arc<RenderService>) -> Self {
        Self { service }
    }

    /// Renders the document described by `params` into a payload reply.
    pub async fn render(&self, _context: MethodContext, params: Params) -> MethodResult {
        let options = RenderOptions::from_params(&params)
            .map_err(|_| HandlerError::Catalog(ErrorKey::InvalidParameter))?;
        let content_type = options.mime_type().map_err(anyhow::Error::from)?;

        let data = match self.service.render(&options).await {
            Ok(data) => data,
            Err(RenderError::MissingSource) => return Err(ErrorKey::MissingUrl.into()),
            Err(e) => return Err(HandlerError::Failed(e.into())),
        };

        Ok(Reply::Payload {
            content_type: content_type.to_string(),
            data,
            attachment: options.attachment_name,
        })
    }
}

impl Component for RenderController {
    fn exports(self: Arc<Self>) -> Vec<(&'static str, MethodHandlerFn)> {
        vec![(
            "render",
            handler_fn(move |context, params| {
                let controller = self.clone();
                async move { controller.render(context, params).await }
            }),
        )]
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
