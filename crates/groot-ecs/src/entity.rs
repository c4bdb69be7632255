//! Entity identifiers and allocation.
//!
//! An [`EntityId`] is a 64-bit handle that packs a *generation* counter in the
//! high 32 bits and an *index* in the low 32 bits. The generation is bumped
//! every time an index is recycled, so a destroyed handle never aliases an
//! entity created later.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// A generational entity identifier. Carries no data, identity only.
///
/// Layout: `[generation: u32 | index: u32]`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Construct an `EntityId` from an index and generation.
    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        Self((generation as u64) << 32 | index as u64)
    }

    /// The index portion (low 32 bits).
    #[inline]
    pub fn index(self) -> u32 {
        self.0 as u32
    }

    /// The generation portion (high 32 bits).
    #[inline]
    pub fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Raw `u64` representation.
    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }

    /// Reconstruct from a raw `u64`.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

/// Allocates and recycles [`EntityId`]s with generational tracking.
///
/// Free indices are kept in a FIFO queue so that generations are spread out
/// over time rather than concentrated on a hot index.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    /// Current generation for each index slot.
    generations: Vec<u32>,
    /// Whether the slot is currently alive.
    alive: Vec<bool>,
    /// Free-list of recyclable indices (FIFO queue).
    free_indices: VecDeque<u32>,
    /// Number of live entities, kept alongside `alive` to avoid a scan.
    live: usize,
}

impl EntityAllocator {
    /// Create a new, empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh [`EntityId`].
    ///
    /// If a recycled index is available it will be reused with an incremented
    /// generation; otherwise a brand-new index is created.
    pub fn allocate(&mut self) -> EntityId {
        self.live += 1;
        if let Some(index) = self.free_indices.pop_front() {
            // Generation was already bumped on deallocate.
            self.alive[index as usize] = true;
            EntityId::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            EntityId::new(index, 0)
        }
    }

    /// Deallocate an entity, incrementing the generation for that index so
    /// that any outstanding handles become stale.
    ///
    /// Returns `true` if the entity was alive and is now gone, `false` if it
    /// was already dead or had a stale generation.
    pub fn deallocate(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let idx = id.index() as usize;
        self.alive[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_indices.push_back(id.index());
        self.live -= 1;
        true
    }

    /// Returns `true` if `id` refers to a currently alive entity whose
    /// generation matches the allocator's current generation for that index.
    pub fn is_alive(&self, id: EntityId) -> bool {
        let idx = id.index() as usize;
        idx < self.generations.len() && self.alive[idx] && self.generations[idx] == id.generation()
    }

    /// Total number of currently alive entities.
    pub fn alive_count(&self) -> usize {
        self.live
    }

    /// Number of index slots ever handed out (alive or free).
    pub fn capacity(&self) -> usize {
        self.generations.len()
    }

    /// Forget every entity. Outstanding handles keep failing `is_alive`
    /// because generations are bumped rather than reset.
    pub fn clear(&mut self) {
        for idx in 0..self.generations.len() {
            if self.alive[idx] {
                self.alive[idx] = false;
                self.generations[idx] = self.generations[idx].wrapping_add(1);
                self.free_indices.push_back(idx as u32);
            }
        }
        self.live = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
