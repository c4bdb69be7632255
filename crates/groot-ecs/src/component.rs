//! Component kinds and typed storage.
//!
//! The set of component kinds is closed: every kind has a stable
//! [`ComponentKind`] tag and one homogeneous [`ComponentStorage`] inside the
//! [`ComponentStore`]. Rust types opt into a kind by implementing
//! [`Component`], which tells the store which table they live in. No runtime
//! type introspection is involved.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::{Animation, Collider, Sprite, Transform, Velocity};
use crate::entity::EntityId;

// ---------------------------------------------------------------------------
// ComponentKind
// ---------------------------------------------------------------------------

/// Stable tag for each component kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum ComponentKind {
    Transform,
    Velocity,
    Collider,
    Sprite,
    Animation,
}

impl ComponentKind {
    /// Every kind, in declaration order.
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::Transform,
        ComponentKind::Velocity,
        ComponentKind::Collider,
        ComponentKind::Sprite,
        ComponentKind::Animation,
    ];

    /// Lowercase name used in logs and digests.
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Transform => "transform",
            ComponentKind::Velocity => "velocity",
            ComponentKind::Collider => "collider",
            ComponentKind::Sprite => "sprite",
            ComponentKind::Animation => "animation",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Component trait
// ---------------------------------------------------------------------------

/// A data record that can be attached to an entity.
///
/// Implemented by the five component types in [`crate::components`]; the
/// associated [`KIND`](Component::KIND) selects the storage table.
pub trait Component: Sized + 'static {
    /// The stable tag of this component's kind.
    const KIND: ComponentKind;

    /// Borrow this kind's table from the store.
    fn storage(store: &ComponentStore) -> &ComponentStorage<Self>;

    /// Mutably borrow this kind's table from the store.
    fn storage_mut(store: &mut ComponentStore) -> &mut ComponentStorage<Self>;
}

macro_rules! impl_component {
    ($ty:ty, $kind:ident, $field:ident) => {
        impl Component for $ty {
            const KIND: ComponentKind = ComponentKind::$kind;

            #[inline]
            fn storage(store: &ComponentStore) -> &ComponentStorage<Self> {
                &store.$field
            }

            #[inline]
            fn storage_mut(store: &mut ComponentStore) -> &mut ComponentStorage<Self> {
                &mut store.$field
            }
        }
    };
}

impl_component!(Transform, Transform, transforms);
impl_component!(Velocity, Velocity, velocities);
impl_component!(Collider, Collider, colliders);
impl_component!(Sprite, Sprite, sprites);
impl_component!(Animation, Animation, animations);

// ---------------------------------------------------------------------------
// ComponentStorage
// ---------------------------------------------------------------------------

/// Sparse-set storage for one component kind.
///
/// Values are packed densely (`entities[i]` owns `values[i]`) and a sparse
/// table maps an entity index to its dense slot. Removal swaps the last
/// element into the hole, so dense order is not insertion order.
#[derive(Debug, Clone)]
pub struct ComponentStorage<T> {
    /// Entity index -> dense slot.
    sparse: Vec<Option<usize>>,
    /// Owning entity per dense slot.
    entities: Vec<EntityId>,
    /// Component values per dense slot.
    values: Vec<T>,
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self {
            sparse: Vec::new(),
            entities: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<T> ComponentStorage<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, entity: EntityId) -> Option<usize> {
        let slot = (*self.sparse.get(entity.index() as usize)?)?;
        // A recycled index with a newer generation must not see the old value.
        (self.entities[slot] == entity).then_some(slot)
    }

    /// Insert or overwrite the value for `entity`. Returns the previous value.
    pub fn insert(&mut self, entity: EntityId, value: T) -> Option<T> {
        let idx = entity.index() as usize;
        if idx >= self.sparse.len() {
            self.sparse.resize(idx + 1, None);
        }
        if let Some(slot) = self.sparse[idx] {
            if self.entities[slot] == entity {
                return Some(std::mem::replace(&mut self.values[slot], value));
            }
            // Leftover from a previous generation of this index.
            self.remove_slot(slot);
        }
        self.sparse[idx] = Some(self.values.len());
        self.entities.push(entity);
        self.values.push(value);
        None
    }

    /// Remove and return the value for `entity`.
    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        let slot = self.slot(entity)?;
        Some(self.remove_slot(slot))
    }

    fn remove_slot(&mut self, slot: usize) -> T {
        let removed = self.entities[slot];
        self.sparse[removed.index() as usize] = None;
        self.entities.swap_remove(slot);
        let value = self.values.swap_remove(slot);
        if let Some(&moved) = self.entities.get(slot) {
            self.sparse[moved.index() as usize] = Some(slot);
        }
        value
    }

    /// Borrow the value for `entity`.
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.slot(entity).map(|slot| &self.values[slot])
    }

    /// Mutably borrow the value for `entity`.
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.slot(entity).map(|slot| &mut self.values[slot])
    }

    /// Mutably borrow the values of two distinct entities at once.
    ///
    /// Returns `None` if `a == b` or either entity has no value.
    pub fn get_pair_mut(&mut self, a: EntityId, b: EntityId) -> Option<(&mut T, &mut T)> {
        if a == b {
            return None;
        }
        let sa = self.slot(a)?;
        let sb = self.slot(b)?;
        if sa < sb {
            let (lo, hi) = self.values.split_at_mut(sb);
            Some((&mut lo[sa], &mut hi[0]))
        } else {
            let (lo, hi) = self.values.split_at_mut(sa);
            Some((&mut hi[0], &mut lo[sb]))
        }
    }

    /// Whether `entity` has a value in this table.
    pub fn contains(&self, entity: EntityId) -> bool {
        self.slot(entity).is_some()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(entity, value)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entities.iter().copied().zip(self.values.iter())
    }

    /// Iterate `(entity, value)` pairs mutably in dense order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entities.iter().copied().zip(self.values.iter_mut())
    }

    /// Entities that own a value, in dense order.
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Drop every value.
    pub fn clear(&mut self) {
        self.sparse.clear();
        self.entities.clear();
        self.values.clear();
    }
}

// ---------------------------------------------------------------------------
// ComponentStore
// ---------------------------------------------------------------------------

/// One table per [`ComponentKind`].
#[derive(Debug, Clone, Default)]
pub struct ComponentStore {
    transforms: ComponentStorage<Transform>,
    velocities: ComponentStorage<Velocity>,
    colliders: ComponentStorage<Collider>,
    sprites: ComponentStorage<Sprite>,
    animations: ComponentStorage<Animation>,
}

/// Simultaneous mutable access to every table.
///
/// Systems that read one kind while writing another (e.g. collision reads
/// colliders and writes transforms) borrow through this split.
pub struct StoresMut<'a> {
    pub transforms: &'a mut ComponentStorage<Transform>,
    pub velocities: &'a mut ComponentStorage<Velocity>,
    pub colliders: &'a mut ComponentStorage<Collider>,
    pub sprites: &'a mut ComponentStorage<Sprite>,
    pub animations: &'a mut ComponentStorage<Animation>,
}

impl ComponentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `entity` holds a component of `kind`.
    pub fn contains(&self, kind: ComponentKind, entity: EntityId) -> bool {
        match kind {
            ComponentKind::Transform => self.transforms.contains(entity),
            ComponentKind::Velocity => self.velocities.contains(entity),
            ComponentKind::Collider => self.colliders.contains(entity),
            ComponentKind::Sprite => self.sprites.contains(entity),
            ComponentKind::Animation => self.animations.contains(entity),
        }
    }

    /// Remove the component of `kind` from `entity`. Returns whether one was
    /// present.
    pub fn remove_kind(&mut self, kind: ComponentKind, entity: EntityId) -> bool {
        match kind {
            ComponentKind::Transform => self.transforms.remove(entity).is_some(),
            ComponentKind::Velocity => self.velocities.remove(entity).is_some(),
            ComponentKind::Collider => self.colliders.remove(entity).is_some(),
            ComponentKind::Sprite => self.sprites.remove(entity).is_some(),
            ComponentKind::Animation => self.animations.remove(entity).is_some(),
        }
    }

    /// Remove every component owned by `entity`. Returns how many were removed.
    pub fn remove_all(&mut self, entity: EntityId) -> usize {
        ComponentKind::ALL
            .iter()
            .filter(|&&kind| self.remove_kind(kind, entity))
            .count()
    }

    /// Number of components stored for `kind`.
    pub fn len_of(&self, kind: ComponentKind) -> usize {
        match kind {
            ComponentKind::Transform => self.transforms.len(),
            ComponentKind::Velocity => self.velocities.len(),
            ComponentKind::Collider => self.colliders.len(),
            ComponentKind::Sprite => self.sprites.len(),
            ComponentKind::Animation => self.animations.len(),
        }
    }

    /// Split into per-kind mutable borrows.
    pub fn split_mut(&mut self) -> StoresMut<'_> {
        StoresMut {
            transforms: &mut self.transforms,
            velocities: &mut self.velocities,
            colliders: &mut self.colliders,
            sprites: &mut self.sprites,
            animations: &mut self.animations,
        }
    }

    /// Drop every component of every kind.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.velocities.clear();
        self.colliders.clear();
        self.sprites.clear();
        self.animations.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
