//! Readiness tracking for visual resources.
//!
//! Loading happens outside the engine. The embedding layer walks each
//! resource through [`ResourceState`] and the render system polls the table
//! before drawing; a sprite whose resource is not [`ResourceState::Ready`]
//! is skipped for that frame.

use std::collections::HashMap;

use groot_ecs::components::{ResourceId, Sprite};
use groot_ecs::registry::Registry;

/// Lifecycle of one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Never requested.
    Unloaded,
    /// Requested; the embedder is fetching it.
    Loading,
    /// Drawable.
    Ready,
    /// The embedder gave up; the reason is kept for diagnostics.
    Failed(String),
}

/// Table of resource states keyed by [`ResourceId`].
///
/// Ids that were never mentioned are reported as [`ResourceState::Unloaded`].
#[derive(Debug, Default)]
pub struct Resources {
    states: HashMap<ResourceId, ResourceState>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of `id`.
    pub fn state(&self, id: &ResourceId) -> ResourceState {
        self.states
            .get(id)
            .cloned()
            .unwrap_or(ResourceState::Unloaded)
    }

    /// Whether `id` can be drawn.
    pub fn is_ready(&self, id: &ResourceId) -> bool {
        matches!(self.states.get(id), Some(ResourceState::Ready))
    }

    /// Move an unloaded resource to `Loading`. Returns `true` if this call
    /// made the transition, `false` if the resource was already known.
    pub fn request(&mut self, id: ResourceId) -> bool {
        if self.states.contains_key(&id) {
            return false;
        }
        tracing::debug!(resource = %id, "resource requested");
        self.states.insert(id, ResourceState::Loading);
        true
    }

    /// Mark `id` as drawable.
    pub fn mark_ready(&mut self, id: ResourceId) {
        tracing::debug!(resource = %id, "resource ready");
        self.states.insert(id, ResourceState::Ready);
    }

    /// Mark `id` as failed. Sprites using it stay invisible.
    pub fn mark_failed(&mut self, id: ResourceId, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(resource = %id, %reason, "resource failed to load");
        self.states.insert(id, ResourceState::Failed(reason));
    }

    /// Forget `id`, returning it to `Unloaded`.
    pub fn evict(&mut self, id: &ResourceId) -> bool {
        self.states.remove(id).is_some()
    }

    /// Request every sprite resource in `registry` that has not been seen
    /// yet. Returns the newly requested ids, sorted, for the embedder to
    /// start loading.
    pub fn request_missing(&mut self, registry: &Registry) -> Vec<ResourceId> {
        let mut wanted: Vec<ResourceId> = registry
            .get_components::<Sprite>()
            .iter()
            .filter_map(|(_, sprite)| sprite.resource.clone())
            .collect();
        wanted.sort();
        wanted.dedup();
        wanted.retain(|id| self.request(id.clone()));
        wanted
    }

    /// Ids currently in `Loading`, sorted.
    pub fn pending(&self) -> Vec<ResourceId> {
        let mut ids: Vec<ResourceId> = self
            .states
            .iter()
            .filter(|(_, state)| **state == ResourceState::Loading)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
