//! Groot ECS -- entity registry and typed component store for the Groot
//! engine.
//!
//! Entities are generational handles. Components come from a closed set of
//! kinds ([`ComponentKind`](component::ComponentKind)); each kind lives in
//! its own sparse-set table keyed by entity. Queries intersect tables and
//! yield entities in creation order.
//!
//! # Quick Start
//!
//! ```
//! use groot_ecs::prelude::*;
//!
//! let mut registry = Registry::new();
//! let player = registry.create_entity();
//! registry.add_component(player, Transform::new(160.0, 90.0)).unwrap();
//! registry.add_component(player, Velocity::default()).unwrap();
//!
//! let movers = registry.get_entities_with(&[ComponentKind::Transform, ComponentKind::Velocity]);
//! assert_eq!(movers, vec![player]);
//!
//! registry.destroy_entity(player);
//! assert!(registry.get_component::<Transform>(player).is_none());
//! ```

#![deny(unsafe_code)]

pub mod component;
pub mod components;
pub mod entity;
pub mod registry;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by ECS operations.
///
/// Lookups never fail: a missing entity or component is an `Option::None`.
/// Only writes that would create orphaned data are rejected.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// The entity does not exist (stale generation or never allocated).
    #[error("entity {0:?} does not exist (stale or never allocated)")]
    StaleEntity(entity::EntityId),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::component::{Component, ComponentKind, ComponentStorage, ComponentStore, StoresMut};
    pub use crate::components::{
        Aabb, Animation, AnimationClip, AnimationFrame, Collider, Color, PlayOutcome, Rect,
        ResourceId, Sprite, Transform, Velocity,
    };
    pub use crate::entity::EntityId;
    pub use crate::registry::Registry;
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn seed_player_like_the_embedder_does() {
        let mut reg = Registry::new();
        let player = reg.create_entity();
        reg.add_component(player, Transform::new(160.0, 90.0)).unwrap();
        reg.add_component(player, Velocity::default()).unwrap();
        reg.add_component(player, Sprite::new("/assets/player.png").with_size(16.0, 16.0))
            .unwrap();

        assert_eq!(
            reg.kinds_of(player),
            vec![ComponentKind::Transform, ComponentKind::Velocity, ComponentKind::Sprite]
        );
        let drawable = reg.get_entities_with(&[ComponentKind::Transform, ComponentKind::Sprite]);
        assert_eq!(drawable, vec![player]);
    }

    #[test]
    fn tables_expose_handle_to_value_mapping() {
        let mut reg = Registry::new();
        let a = reg.create_entity();
        let b = reg.create_entity();
        reg.add_component(a, Collider::new(8.0, 8.0)).unwrap();
        reg.add_component(b, Collider::new(4.0, 4.0)).unwrap();

        let colliders = reg.get_components::<Collider>();
        assert_eq!(colliders.len(), 2);
        let mut widths: Vec<(EntityId, f64)> = colliders.iter().map(|(e, c)| (e, c.width)).collect();
        widths.sort_by_key(|(e, _)| *e);
        assert_eq!(widths, vec![(a, 8.0), (b, 4.0)]);
    }

    #[test]
    fn split_borrows_allow_cross_table_writes() {
        let mut reg = Registry::new();
        let e = reg.create_entity();
        reg.add_component(e, Transform::new(0.0, 0.0)).unwrap();
        reg.add_component(e, Velocity::new(10.0, 0.0)).unwrap();

        let stores = reg.stores_mut();
        if let (Some(t), Some(v)) = (stores.transforms.get_mut(e), stores.velocities.get_mut(e)) {
            t.x += v.x;
            v.x = 0.0;
        }
        assert_eq!(reg.get_component::<Transform>(e).map(|t| t.x), Some(10.0));
        assert_eq!(reg.get_component::<Velocity>(e).map(|v| v.x), Some(0.0));
    }
}
