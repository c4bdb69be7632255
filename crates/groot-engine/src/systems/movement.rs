use std::any::Any;

use groot_ecs::component::ComponentKind;
use groot_ecs::components::{Transform, Velocity};
use groot_ecs::registry::Registry;

use crate::system::System;
use crate::EngineError;

/// Integrates velocity into position for every `{Transform, Velocity}`
/// entity, then applies friction and the speed cap.
#[derive(Debug, Default, Clone, Copy)]
pub struct MovementSystem;

/// One movement step for a single entity.
///
/// Records the previous position before integrating so the renderer always
/// has a matching previous/current pair for this step.
pub fn integrate(transform: &mut Transform, velocity: &mut Velocity, dt_ms: f64) {
    transform.update_previous();
    let dt = dt_ms / 1000.0;
    transform.x += velocity.x * dt;
    transform.y += velocity.y * dt;
    velocity.apply_friction();
    velocity.clamp_to_max_speed();
}

impl System for MovementSystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn update(&mut self, registry: &mut Registry, dt_ms: f64) -> Result<(), EngineError> {
        let movers = registry.get_entities_with(&[ComponentKind::Transform, ComponentKind::Velocity]);
        let stores = registry.stores_mut();
        for entity in movers {
            if let (Some(transform), Some(velocity)) =
                (stores.transforms.get_mut(entity), stores.velocities.get_mut(entity))
            {
                integrate(transform, velocity, dt_ms);
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
