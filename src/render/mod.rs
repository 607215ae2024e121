// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Rendering side channel.
//!
//! Requests negotiated with the `pdf` format do not use the envelope parameters
//! directly: their options are re-derived from the flattened query keys
//! (`pdf.margin.top` and friends) and the response content type comes from the
//! requested output. The browser engine itself runs outside this process behind
//! the [`Renderer`] trait.

use async_trait::async_trait;
use bytes::Bytes;

pub mod command;
pub mod options;

pub use command::CommandRenderer;
pub use options::{GotoOptions, Margin, PdfOptions, RenderOptions, ScreenshotOptions, Viewport};

use crate::error::render::RenderError;

/// Produces document bytes from render options.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Renders the page described by `options` into PDF or image bytes.
    async fn render(&self, options: &RenderOptions) -> Result<Bytes, RenderError>;
}
