// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Built-in components and the factory table that constructs them.
//!
//! | definition          | component          | exports   |
//! |---------------------|--------------------|-----------|
//! | `render.service`    | [`RenderService`]  |           |
//! | `render.controller` | [`RenderController`] | `render` |
//! | `system.controller` | [`SystemController`] | `methods` |

use std::sync::Arc;

pub mod render;
pub mod system;

pub use render::{RenderController, RenderService};
pub use system::SystemController;

use crate::registry::{Component, ComponentFactories};
use crate::render::Renderer;

/// Short name the render controller expects its service under.
pub const RENDER_SERVICE: &str = "S_Render";

/// Factories for every built-in definition.
pub fn standard_factories(renderer: Arc<dyn Renderer>) -> ComponentFactories {
    ComponentFactories::new()
        .register("render.service", move |_ctx| {
            Ok(Arc::new(RenderService::new(renderer.clone())) as Arc<dyn Component>)
        })
        .register("render.controller", |ctx| {
            let service = ctx
                .components
                .require_service::<RenderService>(ctx.name, RENDER_SERVICE)?;
            Ok(Arc::new(RenderController::new(service)) as Arc<dyn Component>)
        })
        .register("system.controller", |ctx| {
            Ok(Arc::new(SystemController::new(ctx.methods.bindings().to_vec())) as Arc<dyn Component>)
        })
}
