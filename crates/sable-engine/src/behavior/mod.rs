//! Behavior controller: per-actor finite-state machines.
//!
//! Every AI or mechanism actor carries one [`BehaviorController`] component.
//! The controller is a closed enum with one variant per actor kind; each
//! variant owns that actor's state machine and implements [`Behavior`].
//! Dispatch is a `match`, so adding a kind means adding a variant and the
//! compiler points at every place that must handle it.
//!
//! While a controller runs, it is taken out of the world and put back
//! afterwards (unless the entity was destroyed meanwhile). A behavior can
//! therefore mutate the world freely but can never reach another entity's
//! behavior state.

pub mod rigelatin_soldier;
pub mod simple_walker;
pub mod sliding_door;
pub mod spike_ball;

use serde::Serialize;

use sable_ecs::entity::EntityId;
use sable_ecs::world::World;

use crate::collision::CollisionSides;
use crate::components::{Active, Velocity};
use crate::context::{GlobalDependencies, GlobalState};
use crate::events::GameEvent;

pub use rigelatin_soldier::RigelatinSoldier;
pub use simple_walker::SimpleWalker;
pub use sliding_door::SlidingDoor;
pub use spike_ball::SpikeBall;

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// Callbacks of one actor kind.
pub trait Behavior {
    /// Runs once per tick while the entity is active.
    fn update(
        &mut self,
        deps: &mut GlobalDependencies<'_>,
        state: &GlobalState,
        is_on_screen: bool,
        world: &mut World,
        entity: EntityId,
    );

    /// Runs when physics reports that `entity` hit the map.
    fn on_collision(
        &mut self,
        _deps: &mut GlobalDependencies<'_>,
        _state: &GlobalState,
        _sides: CollisionSides,
        _world: &mut World,
        _entity: EntityId,
    ) {
    }

    /// Runs when `entity` was shot but survived.
    fn on_damage(
        &mut self,
        _deps: &mut GlobalDependencies<'_>,
        _state: &GlobalState,
        _inflictor_velocity: Velocity,
        _world: &mut World,
        _entity: EntityId,
    ) {
    }

    /// Runs when `entity` enters the active region, before its first update
    /// of the tick. `first_activation` is set only the very first time.
    fn on_activated(
        &mut self,
        _deps: &mut GlobalDependencies<'_>,
        _state: &GlobalState,
        _first_activation: bool,
        _world: &mut World,
        _entity: EntityId,
    ) {
    }
}

// ---------------------------------------------------------------------------
// BehaviorController
// ---------------------------------------------------------------------------

/// The behavior component: one state machine per entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BehaviorController {
    RigelatinSoldier(RigelatinSoldier),
    SpikeBall(SpikeBall),
    SimpleWalker(SimpleWalker),
    SlidingDoor(SlidingDoor),
}

macro_rules! dispatch {
    ($controller:expr, $b:ident => $call:expr) => {
        match $controller {
            BehaviorController::RigelatinSoldier($b) => $call,
            BehaviorController::SpikeBall($b) => $call,
            BehaviorController::SimpleWalker($b) => $call,
            BehaviorController::SlidingDoor($b) => $call,
        }
    };
}

impl Behavior for BehaviorController {
    fn update(
        &mut self,
        deps: &mut GlobalDependencies<'_>,
        state: &GlobalState,
        is_on_screen: bool,
        world: &mut World,
        entity: EntityId,
    ) {
        dispatch!(self, b => b.update(deps, state, is_on_screen, world, entity))
    }

    fn on_collision(
        &mut self,
        deps: &mut GlobalDependencies<'_>,
        state: &GlobalState,
        sides: CollisionSides,
        world: &mut World,
        entity: EntityId,
    ) {
        dispatch!(self, b => b.on_collision(deps, state, sides, world, entity))
    }

    fn on_damage(
        &mut self,
        deps: &mut GlobalDependencies<'_>,
        state: &GlobalState,
        inflictor_velocity: Velocity,
        world: &mut World,
        entity: EntityId,
    ) {
        dispatch!(self, b => b.on_damage(deps, state, inflictor_velocity, world, entity))
    }

    fn on_activated(
        &mut self,
        deps: &mut GlobalDependencies<'_>,
        state: &GlobalState,
        first_activation: bool,
        world: &mut World,
        entity: EntityId,
    ) {
        dispatch!(self, b => b.on_activated(deps, state, first_activation, world, entity))
    }
}

impl BehaviorController {
    /// Short kind name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BehaviorController::RigelatinSoldier(_) => "rigelatin_soldier",
            BehaviorController::SpikeBall(_) => "spike_ball",
            BehaviorController::SimpleWalker(_) => "simple_walker",
            BehaviorController::SlidingDoor(_) => "sliding_door",
        }
    }
}

/// Take the controller out of `entity`, run `f`, and put it back if the
/// entity survived. Does nothing for entities without a controller.
fn with_controller(
    world: &mut World,
    entity: EntityId,
    f: impl FnOnce(&mut BehaviorController, &mut World),
) {
    let Some(mut controller) = world.remove::<BehaviorController>(entity) else {
        return;
    };
    f(&mut controller, world);
    if world.is_alive(entity) {
        world.add(entity, controller);
    }
}

// ---------------------------------------------------------------------------
// System entry points
// ---------------------------------------------------------------------------

/// Run `update` for every active entity with a controller, in creation order.
pub fn update_behaviors(
    deps: &mut GlobalDependencies<'_>,
    state: &GlobalState,
    world: &mut World,
) {
    world.each::<(BehaviorController, Active)>(|world, entity| {
        let is_on_screen = world.component::<Active>(entity).on_screen;
        with_controller(world, entity, |behavior, world| {
            behavior.update(deps, state, is_on_screen, world, entity);
        });
    });
}

/// Route collision, damage and activation events to the named entity's
/// controller.
pub fn handle_event(
    deps: &mut GlobalDependencies<'_>,
    state: &GlobalState,
    world: &mut World,
    event: &GameEvent,
) {
    match *event {
        GameEvent::CollidedWithWorld { entity, sides } => {
            with_controller(world, entity, |behavior, world| {
                behavior.on_collision(deps, state, sides, world, entity);
            });
        }
        GameEvent::ShootableDamaged {
            entity,
            inflictor_velocity,
        } => {
            with_controller(world, entity, |behavior, world| {
                behavior.on_damage(deps, state, inflictor_velocity, world, entity);
            });
        }
        GameEvent::EntityActivated {
            entity,
            first_activation,
        } => {
            with_controller(world, entity, |behavior, world| {
                behavior.on_activated(deps, state, first_activation, world, entity);
            });
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
