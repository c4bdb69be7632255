//! Sprite drawing with interpolation and pixel snapping.

use std::any::Any;

use groot_ecs::component::ComponentKind;
use groot_ecs::components::{Animation, Rect, Sprite, Transform};
use groot_ecs::registry::Registry;

use crate::system::{RenderContext, System};
use crate::EngineError;

/// Draws every visible sprite whose resource is ready.
///
/// Entities are drawn in registry order, so later entities paint over
/// earlier ones.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderSystem;

/// Interpolated draw position of `transform`, snapped to whole pixels.
///
/// Halves round toward positive infinity on both axes, so a sprite moving
/// left and one moving right snap at the same boundaries.
pub fn draw_position(transform: &Transform, alpha: f64) -> (f64, f64) {
    let (x, y) = transform.interpolated(alpha);
    ((x + 0.5).floor(), (y + 0.5).floor())
}

impl System for RenderSystem {
    fn name(&self) -> &'static str {
        "render"
    }

    fn update(&mut self, _registry: &mut Registry, _dt_ms: f64) -> Result<(), EngineError> {
        Ok(())
    }

    fn renders(&self) -> bool {
        true
    }

    fn render(&mut self, ctx: &mut RenderContext<'_>) -> Result<(), EngineError> {
        let registry = ctx.registry;
        let transforms = registry.get_components::<Transform>();
        let sprites = registry.get_components::<Sprite>();
        let animations = registry.get_components::<Animation>();

        for entity in registry.get_entities_with(&[ComponentKind::Transform, ComponentKind::Sprite]) {
            let (Some(transform), Some(sprite)) = (transforms.get(entity), sprites.get(entity)) else {
                continue;
            };
            if !sprite.visible {
                continue;
            }
            let Some(resource) = sprite.resource.as_ref() else {
                continue;
            };
            if !ctx.resources.is_ready(resource) {
                tracing::trace!(%entity, %resource, "sprite skipped, resource not ready");
                continue;
            }

            let (x, y) = draw_position(transform, ctx.alpha);
            let (half_w, half_h) = (sprite.width / 2.0, sprite.height / 2.0);
            let source = animations
                .get(entity)
                .and_then(Animation::current_frame)
                .map(|frame| frame.source);
            let dest = Rect::new(
                -half_w + sprite.offset_x,
                -half_h + sprite.offset_y,
                sprite.width,
                sprite.height,
            );

            let canvas = &mut *ctx.canvas;
            canvas.save();
            canvas.translate(x + half_w, y + half_h);
            canvas.rotate(transform.rotation);
            canvas.scale(transform.scale_x, transform.scale_y);
            let drawn = canvas.draw_image(resource, source, dest, sprite.tint);
            // Keep the transform stack balanced even when the draw fails.
            canvas.restore();
            drawn?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
