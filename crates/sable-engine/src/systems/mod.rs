//! Reactive gameplay systems.
//!
//! Each module exposes a per-tick `update` run by the scheduler and, where
//! the system reacts to events, a `handle_event` called from
//! [`GlobalDependencies::emit`](crate::context::GlobalDependencies::emit).

pub mod damage;
pub mod interaction;
pub mod items;
pub mod lifetime;

use sable_ecs::entity::EntityId;
use sable_ecs::world::World;

use crate::components::{BoundingBox, WorldPosition};

/// World-space box of `entity`, or `None` if it has no position. Entities
/// without a [`BoundingBox`] occupy a single tile.
pub fn world_box(world: &World, entity: EntityId) -> Option<BoundingBox> {
    let position = world.get::<WorldPosition>(entity)?;
    let bbox = world.get::<BoundingBox>(entity).copied().unwrap_or(BoundingBox::UNIT);
    Some(bbox.to_world_space(*position))
}
