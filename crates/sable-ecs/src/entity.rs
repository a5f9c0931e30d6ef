//! Entity identifiers and allocation.
//!
//! An [`EntityId`] is a 64-bit handle that packs a *generation* counter in the
//! high 32 bits and an *index* in the low 32 bits. The generation is bumped
//! the moment an entity is destroyed, so every outstanding handle becomes
//! stale immediately even though its slot is only reclaimed at the next
//! destruction sweep.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// A generational entity identifier.
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
// SlotState
// ---------------------------------------------------------------------------

/// Lifecycle of an index slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    /// Holds a live entity.
    Alive,
    /// Destroyed this tick; component rows still occupy the slot until the
    /// next sweep, but no handle refers to it any more.
    PendingSweep,
    /// Reusable.
    Free,
}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

/// Allocates and recycles [`EntityId`]s with generational tracking.
///
/// Free indices are kept in a FIFO queue so that generations are spread out
/// over time rather than concentrated on a hot index. Destroyed slots are
/// parked in a pending list and only become reusable after
/// [`release_pending`](Self::release_pending), so an index is never handed
/// out again while stale component rows still live in it.
#[derive(Debug)]
pub struct EntityAllocator {
    /// Current generation for each index slot.
    generations: Vec<u32>,
    /// Lifecycle state of each slot.
    states: Vec<SlotState>,
    /// Free-list of recyclable indices (FIFO queue).
    free_indices: VecDeque<u32>,
    /// Slots destroyed since the last sweep, in destruction order.
    pending: Vec<u32>,
    /// Number of slots in [`SlotState::Alive`].
    alive: usize,
}

impl EntityAllocator {
    /// Create a new, empty allocator.
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            states: Vec::new(),
            free_indices: VecDeque::new(),
            pending: Vec::new(),
            alive: 0,
        }
    }

    /// Allocate a fresh [`EntityId`].
    ///
    /// If a recycled index is available it will be reused with the generation
    /// that was bumped on destruction; otherwise a brand-new index is created.
    pub fn allocate(&mut self) -> EntityId {
        self.alive += 1;
        if let Some(index) = self.free_indices.pop_front() {
            self.states[index as usize] = SlotState::Alive;
            EntityId::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.states.push(SlotState::Alive);
            EntityId::new(index, 0)
        }
    }

    /// Mark an entity destroyed, bumping the generation of its slot so that
    /// any outstanding handles become stale right away.
    ///
    /// Returns `true` if the entity was alive, `false` if the handle was
    /// already stale.
    pub fn mark_destroyed(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let idx = id.index() as usize;
        self.states[idx] = SlotState::PendingSweep;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.pending.push(id.index());
        self.alive -= 1;
        true
    }

    /// Move every pending slot to the free list and return their indices in
    /// destruction order.
    pub fn release_pending(&mut self) -> Vec<u32> {
        let released = std::mem::take(&mut self.pending);
        for &index in &released {
            self.states[index as usize] = SlotState::Free;
            self.free_indices.push_back(index);
        }
        released
    }

    /// Number of slots waiting for the next sweep.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if `id` refers to a currently alive entity whose
    /// generation matches the allocator's current generation for that index.
    pub fn is_alive(&self, id: EntityId) -> bool {
        let idx = id.index() as usize;
        if idx >= self.generations.len() {
            return false;
        }
        self.states[idx] == SlotState::Alive && self.generations[idx] == id.generation()
    }

    /// Returns `true` if `id` was alive until it was destroyed since the last
    /// sweep, so its rows are still in place.
    pub fn is_pending_sweep(&self, id: EntityId) -> bool {
        let idx = id.index() as usize;
        if idx >= self.generations.len() {
            return false;
        }
        self.states[idx] == SlotState::PendingSweep
            && self.generations[idx] == id.generation().wrapping_add(1)
    }

    /// Total number of currently alive entities.
    pub fn alive_count(&self) -> usize {
        self.alive
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
