//! Brute-force AABB collision detection and positional resolution.
//!
//! Every unordered pair of `{Transform, Collider}` entities is tested each
//! step, so cost grows as O(n^2). There is no broad phase; entity counts
//! must stay small enough for that to fit the frame budget.
//!
//! Pairs are visited in registry order (`i < j`) and each pair's boxes are
//! recomputed from the current transforms, so a correction made earlier in
//! the step is visible to later pairs.

use std::any::Any;

use groot_ecs::component::ComponentKind;
use groot_ecs::components::{Aabb, Transform, Velocity};
use groot_ecs::entity::EntityId;
use groot_ecs::registry::Registry;

use crate::system::System;
use crate::EngineError;

/// Axis along which an overlap was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// An overlapping pair detected during the last step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Earlier entity in registry order.
    pub a: EntityId,
    pub b: EntityId,
    /// Axis the pair was pushed apart on; `None` when either side is
    /// non-solid or a trigger.
    pub resolved: Option<Axis>,
    /// Whether either collider is a trigger.
    pub trigger: bool,
}

/// Detects overlaps between colliders and separates solid pairs.
#[derive(Debug, Default, Clone)]
pub struct CollisionSystem {
    contacts: Vec<Contact>,
}

impl CollisionSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every overlapping pair found in the last step, in visit order.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }
}

/// Push two overlapping boxes apart along the axis of least penetration.
///
/// Each transform moves by half the overlap, away from the other. When the
/// X and Y overlaps are exactly equal the pair is resolved along Y.
pub fn resolve_pair(
    box_a: &Aabb,
    box_b: &Aabb,
    transform_a: &mut Transform,
    transform_b: &mut Transform,
) -> Axis {
    let overlap_x = box_a.overlap_x(box_b);
    let overlap_y = box_a.overlap_y(box_b);

    if overlap_x < overlap_y {
        let half = overlap_x / 2.0;
        if box_a.x < box_b.x {
            transform_a.x -= half;
            transform_b.x += half;
        } else {
            transform_a.x += half;
            transform_b.x -= half;
        }
        Axis::X
    } else {
        let half = overlap_y / 2.0;
        if box_a.y < box_b.y {
            transform_a.y -= half;
            transform_b.y += half;
        } else {
            transform_a.y += half;
            transform_b.y -= half;
        }
        Axis::Y
    }
}

fn stop_along(velocity: &mut Velocity, axis: Axis) {
    match axis {
        Axis::X => velocity.x = 0.0,
        Axis::Y => velocity.y = 0.0,
    }
}

impl System for CollisionSystem {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn update(&mut self, registry: &mut Registry, _dt_ms: f64) -> Result<(), EngineError> {
        self.contacts.clear();
        let bodies = registry.get_entities_with(&[ComponentKind::Transform, ComponentKind::Collider]);
        let stores = registry.stores_mut();

        for (i, &a) in bodies.iter().enumerate() {
            for &b in &bodies[i + 1..] {
                let (Some(collider_a), Some(collider_b)) =
                    (stores.colliders.get(a), stores.colliders.get(b))
                else {
                    continue;
                };
                let (Some(transform_a), Some(transform_b)) =
                    (stores.transforms.get(a), stores.transforms.get(b))
                else {
                    continue;
                };

                let box_a = collider_a.aabb(transform_a);
                let box_b = collider_b.aabb(transform_b);
                if !box_a.intersects(&box_b) {
                    continue;
                }

                let trigger = collider_a.trigger || collider_b.trigger;
                let mut resolved = None;
                if collider_a.blocks() && collider_b.blocks() {
                    if let Some((transform_a, transform_b)) = stores.transforms.get_pair_mut(a, b) {
                        let axis = resolve_pair(&box_a, &box_b, transform_a, transform_b);
                        for entity in [a, b] {
                            if let Some(velocity) = stores.velocities.get_mut(entity) {
                                stop_along(velocity, axis);
                            }
                        }
                        resolved = Some(axis);
                    }
                }

                tracing::trace!(%a, %b, ?resolved, trigger, "collider overlap");
                self.contacts.push(Contact {
                    a,
                    b,
                    resolved,
                    trigger,
                });
            }
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
