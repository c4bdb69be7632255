//! The [`Registry`] is the top-level container for the ECS. It owns the
//! entity allocator, the live-entity iteration order and the component store.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::component::{Component, ComponentKind, ComponentStorage, ComponentStore, StoresMut};
use crate::components::{Animation, Collider, Sprite, Transform, Velocity};
use crate::entity::{EntityAllocator, EntityId};
use crate::EcsError;

/// Entity registry and component store.
///
/// Live entities are iterated in creation order. Destroying an entity
/// removes it and every component it owns before returning, so no partial
/// state is ever observable.
#[derive(Debug, Default)]
pub struct Registry {
    allocator: EntityAllocator,
    /// Creation sequence number -> entity. Iteration order for queries.
    order: BTreeMap<u64, EntityId>,
    /// Entity index -> creation sequence number of its current occupant.
    spawn_seq: Vec<u64>,
    next_seq: u64,
    store: ComponentStore,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // -- entities -------------------------------------------------------------

    /// Issue a fresh entity handle with no components.
    pub fn create_entity(&mut self) -> EntityId {
        let entity = self.allocator.allocate();
        let idx = entity.index() as usize;
        if idx >= self.spawn_seq.len() {
            self.spawn_seq.resize(idx + 1, 0);
        }
        self.spawn_seq[idx] = self.next_seq;
        self.order.insert(self.next_seq, entity);
        self.next_seq += 1;
        tracing::trace!(%entity, "entity created");
        entity
    }

    /// Destroy `entity` and every component attached to it.
    ///
    /// Returns `false` if the handle was not alive, which is not an error.
    pub fn destroy_entity(&mut self, entity: EntityId) -> bool {
        if !self.allocator.deallocate(entity) {
            return false;
        }
        let seq = self.spawn_seq[entity.index() as usize];
        self.order.remove(&seq);
        let removed = self.store.remove_all(entity);
        tracing::trace!(%entity, components = removed, "entity destroyed");
        true
    }

    /// Whether `entity` is a live handle.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Live entities in creation order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.order.values().copied()
    }

    /// Destroy every entity and component.
    pub fn clear(&mut self) {
        self.allocator.clear();
        self.order.clear();
        self.store.clear();
    }

    // -- components -----------------------------------------------------------

    /// Attach `component` to `entity`, silently replacing any component of
    /// the same kind. Returns the replaced value.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if `entity` is not alive.
    pub fn add_component<T: Component>(
        &mut self,
        entity: EntityId,
        component: T,
    ) -> Result<Option<T>, EcsError> {
        if !self.is_alive(entity) {
            return Err(EcsError::StaleEntity(entity));
        }
        Ok(T::storage_mut(&mut self.store).insert(entity, component))
    }

    /// Detach and return the `T` component of `entity`, if any.
    pub fn remove_component<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        T::storage_mut(&mut self.store).remove(entity)
    }

    /// Detach the component of `kind` from `entity`. Returns whether one was
    /// present.
    pub fn remove_kind(&mut self, entity: EntityId, kind: ComponentKind) -> bool {
        self.store.remove_kind(kind, entity)
    }

    /// Borrow the `T` component of `entity`.
    pub fn get_component<T: Component>(&self, entity: EntityId) -> Option<&T> {
        T::storage(&self.store).get(entity)
    }

    /// Mutably borrow the `T` component of `entity`.
    pub fn get_component_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        T::storage_mut(&mut self.store).get_mut(entity)
    }

    /// Whether `entity` holds a `T`.
    pub fn has_component<T: Component>(&self, entity: EntityId) -> bool {
        T::storage(&self.store).contains(entity)
    }

    /// The whole table for `T`: every entity holding one, with its value.
    pub fn get_components<T: Component>(&self) -> &ComponentStorage<T> {
        T::storage(&self.store)
    }

    /// Mutable access to the whole table for `T`.
    pub fn get_components_mut<T: Component>(&mut self) -> &mut ComponentStorage<T> {
        T::storage_mut(&mut self.store)
    }

    /// Kinds currently attached to `entity`.
    pub fn kinds_of(&self, entity: EntityId) -> Vec<ComponentKind> {
        ComponentKind::ALL
            .into_iter()
            .filter(|&kind| self.store.contains(kind, entity))
            .collect()
    }

    /// Live entities holding every kind in `kinds`, in creation order.
    ///
    /// An empty `kinds` slice matches every live entity.
    pub fn get_entities_with(&self, kinds: &[ComponentKind]) -> Vec<EntityId> {
        self.order
            .values()
            .copied()
            .filter(|&entity| kinds.iter().all(|&kind| self.store.contains(kind, entity)))
            .collect()
    }

    /// Per-kind mutable borrows for systems that touch several tables.
    pub fn stores_mut(&mut self) -> StoresMut<'_> {
        self.store.split_mut()
    }

    /// Read-only access to the component store.
    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    // -- determinism ----------------------------------------------------------

    /// BLAKE3 hex digest of every live entity and its components, in
    /// creation order.
    ///
    /// Two registries driven through the same operations produce the same
    /// digest, which makes this the check for simulation determinism.
    pub fn state_digest(&self) -> String {
        #[derive(Serialize)]
        struct EntityState<'a> {
            id: EntityId,
            transform: Option<&'a Transform>,
            velocity: Option<&'a Velocity>,
            collider: Option<&'a Collider>,
            sprite: Option<&'a Sprite>,
            animation: Option<&'a Animation>,
        }

        let state: Vec<EntityState<'_>> = self
            .entities()
            .map(|id| EntityState {
                id,
                transform: self.get_component(id),
                velocity: self.get_component(id),
                collider: self.get_component(id),
                sprite: self.get_component(id),
                animation: self.get_component(id),
            })
            .collect();

        let json_bytes =
            serde_json::to_vec(&state).expect("registry state should always be JSON-serializable");
        blake3::hash(&json_bytes).to_hex().to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
