//! Entity factory: builds the component set of every actor kind.
//!
//! The simulation core only knows the [`EntityFactory`] trait. Level loading
//! and dynamic spawning (released items, floating score numbers, impact
//! smoke) go through
//! it, so a game can swap in its own catalogue. [`StandardFactory`] is the
//! catalogue used by the harness and the tests.

use serde::{Deserialize, Serialize};

use sable_ecs::entity::EntityId;
use sable_ecs::world::World;

use crate::behavior::{BehaviorController, RigelatinSoldier, SimpleWalker, SlidingDoor, SpikeBall};
use crate::components::{
    ActivationPolicy, ActivationSettings, Active, AutoDestroy, BoundingBox, CollectableItem,
    DoorTag, DrawTopMost, Interactable, MovementSequence, MovingBody, Orientation, PlayerDamaging,
    Shootable, Vector, Velocity, WorldPosition,
};

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Actor kinds a level can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    RigelatinSoldier,
    SpikeBall,
    SimpleWalker,
    SlidingDoor,
    Teleporter,
}

/// Floating score number sprites, largest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreNumber {
    S10000,
    S5000,
    S2000,
    S1000,
    S500,
    S100,
}

impl ScoreNumber {
    /// Every number, in descending value.
    pub const ALL: [ScoreNumber; 6] = [
        ScoreNumber::S10000,
        ScoreNumber::S5000,
        ScoreNumber::S2000,
        ScoreNumber::S1000,
        ScoreNumber::S500,
        ScoreNumber::S100,
    ];

    pub fn value(self) -> u32 {
        match self {
            ScoreNumber::S10000 => 10000,
            ScoreNumber::S5000 => 5000,
            ScoreNumber::S2000 => 2000,
            ScoreNumber::S1000 => 1000,
            ScoreNumber::S500 => 500,
            ScoreNumber::S100 => 100,
        }
    }
}

/// Tags the puff left behind where a fragile entity hit the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImpactSmoke;

/// Rises for a few ticks, then hovers until the timeout removes it.
const SCORE_NUMBER_MOVE_SEQUENCE: &[Vector] = &[
    Vector::new(0, -1),
    Vector::new(0, -1),
    Vector::new(0, -1),
    Vector::new(0, -1),
    Vector::new(0, -1),
    Vector::new(0, -1),
    Vector::new(0, 0),
    Vector::new(0, 0),
    Vector::new(0, 0),
    Vector::new(0, 0),
];

const SCORE_NUMBER_LIFE_TIME: u32 = 60;

const IMPACT_SMOKE_LIFE_TIME: u32 = 4;

// ---------------------------------------------------------------------------
// EntityFactory
// ---------------------------------------------------------------------------

/// Creates pre-configured entities.
pub trait EntityFactory {
    /// Place an actor of `kind` with its full initial component set.
    fn create_actor(
        &mut self,
        world: &mut World,
        kind: ActorKind,
        position: WorldPosition,
    ) -> EntityId;

    /// Spawn a floating score number. Dynamic spawns start active.
    fn create_floating_score_number(
        &mut self,
        world: &mut World,
        number: ScoreNumber,
        position: WorldPosition,
    ) -> EntityId;

    /// Spawn a collectable item, for example one released by a container.
    fn create_item(
        &mut self,
        world: &mut World,
        item: CollectableItem,
        bounds: BoundingBox,
        position: WorldPosition,
    ) -> EntityId;

    /// Spawn the smoke puff of an entity destroyed by hitting the map.
    fn create_impact_smoke(&mut self, world: &mut World, position: WorldPosition) -> EntityId;
}

// ---------------------------------------------------------------------------
// StandardFactory
// ---------------------------------------------------------------------------

/// The built-in actor catalogue.
#[derive(Debug, Default)]
pub struct StandardFactory;

impl StandardFactory {
    pub fn new() -> Self {
        Self
    }

    fn enemy(
        world: &mut World,
        position: WorldPosition,
        bounds: BoundingBox,
        shootable: Shootable,
    ) -> EntityId {
        world.spawn((
            position,
            bounds,
            MovingBody::new(Velocity::default(), true),
            shootable,
            PlayerDamaging {
                amount: 1,
                destroy_on_contact: false,
            },
            ActivationSettings::default(),
        ))
    }
}

impl EntityFactory for StandardFactory {
    fn create_actor(
        &mut self,
        world: &mut World,
        kind: ActorKind,
        position: WorldPosition,
    ) -> EntityId {
        let entity = match kind {
            ActorKind::RigelatinSoldier => {
                let e = Self::enemy(
                    world,
                    position,
                    BoundingBox::new(0, 0, 2, 3),
                    Shootable {
                        health: 3,
                        given_score: 2000,
                    },
                );
                let soldier = RigelatinSoldier::new();
                world.add(e, BehaviorController::RigelatinSoldier(soldier));
                e
            }
            ActorKind::SpikeBall => {
                let e = Self::enemy(
                    world,
                    position,
                    BoundingBox::UNIT,
                    Shootable {
                        health: 5,
                        given_score: 1000,
                    },
                );
                world.add(
                    e,
                    ActivationSettings::new(ActivationPolicy::AlwaysAfterFirstActivation),
                );
                world.add(e, BehaviorController::SpikeBall(SpikeBall::new()));
                e
            }
            ActorKind::SimpleWalker => {
                let e = Self::enemy(
                    world,
                    position,
                    BoundingBox::new(0, 0, 2, 1),
                    Shootable {
                        health: 1,
                        given_score: 100,
                    },
                );
                world.add(
                    e,
                    BehaviorController::SimpleWalker(SimpleWalker::new(Orientation::Left, false)),
                );
                e
            }
            ActorKind::SlidingDoor => world.spawn((
                position,
                BoundingBox::new(0, 0, 1, 5),
                DoorTag,
                BehaviorController::SlidingDoor(SlidingDoor::new()),
                ActivationSettings::default(),
            )),
            ActorKind::Teleporter => world.spawn((
                position,
                BoundingBox::new(0, 0, 2, 3),
                Interactable::Teleporter,
                ActivationSettings::default(),
            )),
        };
        tracing::trace!(entity = %entity, ?kind, x = position.x, y = position.y, "actor created");
        entity
    }

    fn create_floating_score_number(
        &mut self,
        world: &mut World,
        number: ScoreNumber,
        position: WorldPosition,
    ) -> EntityId {
        let body = MovingBody {
            ignore_collisions: true,
            ..MovingBody::new(Velocity::default(), false)
        };
        world.spawn((
            position,
            BoundingBox::UNIT,
            number,
            body,
            MovementSequence::new(SCORE_NUMBER_MOVE_SEQUENCE, false, false),
            AutoDestroy::after_timeout(SCORE_NUMBER_LIFE_TIME),
            DrawTopMost,
            Active { on_screen: true },
        ))
    }

    fn create_item(
        &mut self,
        world: &mut World,
        item: CollectableItem,
        bounds: BoundingBox,
        position: WorldPosition,
    ) -> EntityId {
        world.spawn((
            position,
            bounds,
            item,
            MovingBody::new(Velocity::default(), true),
            ActivationSettings::default(),
            Active { on_screen: true },
        ))
    }

    fn create_impact_smoke(&mut self, world: &mut World, position: WorldPosition) -> EntityId {
        let body = MovingBody {
            ignore_collisions: true,
            ..MovingBody::new(Velocity::new(0.0, -1.0), false)
        };
        world.spawn((
            position,
            BoundingBox::UNIT,
            ImpactSmoke,
            body,
            AutoDestroy::after_timeout(IMPACT_SMOKE_LIFE_TIME),
            DrawTopMost,
            Active { on_screen: true },
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
