//! Serializable world snapshots.
//!
//! [`WorldSnapshot`] captures every live entity with its components rendered
//! to JSON under their registered names. Entities are listed in creation
//! order and component maps are `BTreeMap`s, so the JSON form of a snapshot
//! is canonical and can be hashed to compare simulation runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::world::World;

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// Serializable snapshot of a single entity's component data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// The entity's ID (index + generation).
    pub entity_id: EntityId,
    /// Map from component name to serialized JSON value.
    pub components: BTreeMap<String, serde_json::Value>,
}

/// Every live entity in the world, in creation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Names of all registered component types, sorted.
    pub component_names: Vec<String>,
    /// All live entities with their serialized component data.
    pub entities: Vec<EntitySnapshot>,
}

impl WorldSnapshot {
    /// Find an entity's snapshot by ID.
    pub fn entity(&self, entity_id: EntityId) -> Option<&EntitySnapshot> {
        self.entities.iter().find(|e| e.entity_id == entity_id)
    }
}

// ---------------------------------------------------------------------------
// World snapshot impl
// ---------------------------------------------------------------------------

impl World {
    /// Snapshot a single live entity.
    pub fn entity_snapshot(&self, entity: EntityId) -> Option<EntitySnapshot> {
        if !self.is_alive(entity) {
            return None;
        }
        let mut components = BTreeMap::new();
        for (index, storage) in self.storages.iter().enumerate() {
            let Some(value) = storage.to_json(entity.index()) else {
                continue;
            };
            let name = self
                .registry
                .get_info(crate::component::ComponentTypeId(index as u32))
                .map(|info| info.name.clone());
            match name {
                Some(name) => {
                    components.insert(name, value);
                }
                None => tracing::warn!(
                    entity_id = %entity,
                    storage_index = index,
                    "storage has no registered name -- skipping in snapshot"
                ),
            }
        }
        Some(EntitySnapshot {
            entity_id: entity,
            components,
        })
    }

    /// Capture every live entity.
    pub fn capture_snapshot(&self) -> WorldSnapshot {
        let component_names = self
            .registry
            .registered_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let entities = self
            .creation_order
            .iter()
            .filter_map(|&e| self.entity_snapshot(e))
            .collect();
        WorldSnapshot {
            component_names,
            entities,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
