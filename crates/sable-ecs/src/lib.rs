//! Sable ECS -- handle-indexed Entity Component System for the Sable
//! simulation core.
//!
//! Components live in one table per registered type, indexed by the entity's
//! slot. Generational entity IDs make a destroyed handle stale the moment
//! [`World::destroy`](world::World::destroy) is called, while the slot itself
//! is only recycled at the end-of-tick sweep. All traversals run in entity
//! creation order.
//!
//! # Quick Start
//!
//! ```
//! use sable_ecs::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq, serde::Serialize)]
//! struct Position { x: i32, y: i32 }
//!
//! #[derive(Debug, Clone, PartialEq, serde::Serialize)]
//! struct Velocity { dx: f32, dy: f32 }
//!
//! let mut world = World::new();
//! world.register_component::<Position>("position");
//! world.register_component::<Velocity>("velocity");
//!
//! let entity = world.spawn((Position { x: 0, y: 0 }, Velocity { dx: 1.0, dy: 0.0 }));
//!
//! world.each::<(Position, Velocity)>(|world, e| {
//!     let dx = world.component::<Velocity>(e).dx as i32;
//!     world.component_mut::<Position>(e).x += dx;
//! });
//!
//! assert_eq!(world.get::<Position>(entity), Some(&Position { x: 1, y: 0 }));
//! ```

#![deny(unsafe_code)]

pub mod component;
pub mod entity;
pub mod query;
pub mod snapshot;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by ECS operations.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// The entity does not exist (destroyed, stale generation or never allocated).
    #[error("entity {entity:?} does not exist (stale or never allocated)")]
    StaleEntity { entity: entity::EntityId },

    /// A component type was referenced that has not been registered.
    #[error("component type '{name}' not registered. Registered components: [{registered}]")]
    UnknownComponent { name: String, registered: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::component::{Component, ComponentInfo, ComponentRegistry, ComponentTypeId};
    pub use crate::entity::EntityId;
    pub use crate::query::{Bundle, Query, QueryItem, QueryIter, Signature};
    pub use crate::snapshot::{EntitySnapshot, WorldSnapshot};
    pub use crate::world::{SpawnMarker, World};
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    // -- test component types -----------------------------------------------

    #[derive(Debug, Clone, PartialEq, serde::Serialize)]
    struct Position {
        x: i32,
        y: i32,
    }

    #[derive(Debug, Clone, PartialEq, serde::Serialize)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }

    #[derive(Debug, Clone, PartialEq, serde::Serialize)]
    struct Health(u32);

    fn setup_world() -> World {
        let mut world = World::new();
        world.register_component::<Position>("position");
        world.register_component::<Velocity>("velocity");
        world.register_component::<Health>("health");
        world
    }

    // -- spawn / destroy integration ----------------------------------------

    #[test]
    fn spawn_entities_with_components_and_read_back() {
        let mut world = setup_world();
        let e = world.spawn((Position { x: 1, y: 2 }, Velocity { dx: 3.0, dy: 4.0 }));

        assert_eq!(world.get::<Position>(e), Some(&Position { x: 1, y: 2 }));
        assert_eq!(
            world.get::<Velocity>(e),
            Some(&Velocity { dx: 3.0, dy: 4.0 })
        );
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn destroy_then_sweep_reclaims_everything() {
        let mut world = setup_world();
        let e = world.spawn((Position { x: 0, y: 0 }, Health(10)));
        assert!(world.destroy(e));
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.sweep_destroyed(), 1);
        assert_eq!(world.sweep_destroyed(), 0);
        assert_eq!(world.capture_snapshot().entities.len(), 0);
    }

    // -- structural changes during traversal --------------------------------

    #[test]
    fn adding_components_during_each_is_tolerated() {
        let mut world = setup_world();
        let a = world.spawn_with(Position { x: 0, y: 0 });
        let b = world.spawn_with(Position { x: 1, y: 0 });
        world.each::<(Position,)>(|world, e| {
            world.add(e, Health(5));
            if e == a {
                world.add(b, Velocity { dx: 0.0, dy: 0.0 });
            }
        });
        assert!(world.has::<(Position, Health)>(a));
        assert!(world.has::<(Position, Health, Velocity)>(b));
    }

    #[test]
    fn removing_own_component_during_each_is_tolerated() {
        let mut world = setup_world();
        for i in 0..4 {
            world.spawn((Position { x: i, y: 0 }, Health(1)));
        }
        let mut visits = 0;
        world.each::<(Position, Health)>(|world, e| {
            visits += 1;
            world.remove::<Health>(e);
        });
        assert_eq!(visits, 4);
        assert_eq!(world.count_with::<Health>(), 0);
    }

    #[test]
    fn entities_with_lists_in_creation_order() {
        let mut world = setup_world();
        let a = world.spawn((Position { x: 0, y: 0 }, Health(1)));
        let _ = world.spawn_with(Position { x: 1, y: 0 });
        let c = world.spawn((Position { x: 2, y: 0 }, Health(2)));
        assert_eq!(world.entities_with::<(Position, Health)>(), vec![a, c]);
    }
}
