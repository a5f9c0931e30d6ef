//! Sable Engine -- deterministic simulation core for a tile-based 2D action
//! game.
//!
//! This crate builds on [`sable_ecs`] to provide everything that happens
//! inside one game tick: activation around the camera, actor behavior state
//! machines, two-phase tile physics, and the reactive damage, item and
//! interaction systems. Rendering, audio and input devices stay outside; the
//! core reports what happened as [`GameEvent`](events::GameEvent)s.
//!
//! # Quick Start
//!
//! ```
//! use sable_engine::prelude::*;
//!
//! let map = GridMap::from_ascii(&[
//!     "....................",
//!     "....................",
//!     "....................",
//!     "....................",
//!     "....................",
//!     "####################",
//! ])
//! .unwrap();
//! let mut sim =
//!     Simulation::with_standard_factory(Box::new(map), SimConfig::default()).unwrap();
//! sim.spawn_player(Vector::new(1, 0));
//! sim.create_actor(ActorKind::SpikeBall, Vector::new(10, 4));
//!
//! let events = sim.tick(&InputFrame::default());
//! assert!(events
//!     .iter()
//!     .any(|e| matches!(e, GameEvent::EntityActivated { .. })));
//! assert_eq!(sim.tick_count(), 1);
//! ```

#![deny(unsafe_code)]

pub mod activation;
pub mod behavior;
pub mod collision;
pub mod components;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod factory;
pub mod map;
pub mod movement;
pub mod physics;
pub mod player;
pub mod rng;
pub mod snapshot;
pub mod systems;
pub mod tick;

use sable_ecs::world::World;

use crate::behavior::BehaviorController;
use crate::components::{
    ActivationSettings, Active, AutoDestroy, BoundingBox, CollectableItem, DamageInflicting,
    DoorTag, DrawTopMost, Interactable, ItemContainer, MovementSequence, MovingBody, Player,
    PlayerDamaging, Shootable, WorldPosition,
};
use crate::factory::{ImpactSmoke, ScoreNumber};

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the ECS crate for convenience.
pub use sable_ecs;

/// Register every component type the core uses, under the names that appear
/// in snapshots.
pub fn register_components(world: &mut World) {
    world.register_component::<WorldPosition>("world_position");
    world.register_component::<BoundingBox>("bounding_box");
    world.register_component::<MovingBody>("moving_body");
    world.register_component::<MovementSequence>("movement_sequence");

    world.register_component::<Active>("active");
    world.register_component::<ActivationSettings>("activation_settings");
    world.register_component::<AutoDestroy>("auto_destroy");

    world.register_component::<Player>("player");
    world.register_component::<DoorTag>("door_tag");
    world.register_component::<DrawTopMost>("draw_top_most");

    world.register_component::<Shootable>("shootable");
    world.register_component::<PlayerDamaging>("player_damaging");
    world.register_component::<DamageInflicting>("damage_inflicting");
    world.register_component::<CollectableItem>("collectable_item");
    world.register_component::<ItemContainer>("item_container");
    world.register_component::<Interactable>("interactable");
    world.register_component::<BehaviorController>("behavior_controller");
    world.register_component::<ScoreNumber>("score_number");
    world.register_component::<ImpactSmoke>("impact_smoke");
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use sable_ecs::prelude::*;

    pub use crate::behavior::{Behavior, BehaviorController};
    pub use crate::collision::{CollisionChecker, CollisionSides};
    pub use crate::components::{
        ActivationPolicy, ActivationSettings, Active, AutoDestroy, BoundingBox, CollectableItem,
        CollectableLetter, DamageInflicting, Interactable, InventoryItem, ItemContainer,
        MovementSequence, MovingBody, Orientation, Player, PlayerDamaging, Shootable, Vector,
        Velocity, WorldPosition,
    };
    pub use crate::config::SimConfig;
    pub use crate::error::EngineError;
    pub use crate::events::{GameEvent, SoundId};
    pub use crate::factory::{ActorKind, EntityFactory, ImpactSmoke, ScoreNumber, StandardFactory};
    pub use crate::map::{GridMap, TileAttributes, TileMap};
    pub use crate::movement::MovementResult;
    pub use crate::physics::PHYSICS_SYSTEM_NAME;
    pub use crate::player::PlayerModel;
    pub use crate::snapshot::SimulationSnapshot;
    pub use crate::tick::{InputFrame, Phase, Simulation, TickDiagnostics, PHASE_ORDER};
}
