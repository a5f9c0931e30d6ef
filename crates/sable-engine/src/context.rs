//! Explicit per-tick context passed to every system.
//!
//! [`GlobalDependencies`] bundles the services a system may use (collision
//! queries, RNG, entity factory, player model, event bus). [`GlobalState`]
//! is a read-only view of the frame: tick number, camera, input and where
//! the player is. Neither is global; the scheduler builds them for each
//! tick and hands them down.

use sable_ecs::entity::EntityId;
use sable_ecs::world::World;

use crate::behavior;
use crate::collision::CollisionChecker;
use crate::components::{BoundingBox, Vector, WorldPosition};
use crate::config::SimConfig;
use crate::events::{EventBus, GameEvent};
use crate::factory::EntityFactory;
use crate::player::PlayerModel;
use crate::rng::GameRng;
use crate::systems::{interaction, items, lifetime};
use crate::tick::InputFrame;

// ---------------------------------------------------------------------------
// GlobalState
// ---------------------------------------------------------------------------

/// Read-only facts about the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalState {
    pub tick: u64,
    /// Top-left corner of the visible viewport.
    pub camera: Vector,
    pub input: InputFrame,
    /// Input of the tick before, all released on the first tick.
    pub previous_input: InputFrame,
    pub player: Option<EntityId>,
    pub player_position: Option<WorldPosition>,
    /// Player hit box in world space.
    pub player_bounds: Option<BoundingBox>,
}

impl GlobalState {
    pub fn new(tick: u64, camera: Vector, input: InputFrame, player: Option<EntityId>) -> Self {
        Self {
            tick,
            camera,
            input,
            previous_input: InputFrame::default(),
            player,
            player_position: None,
            player_bounds: None,
        }
    }

    pub fn with_previous_input(mut self, previous_input: InputFrame) -> Self {
        self.previous_input = previous_input;
        self
    }

    /// Whether interact went down this tick.
    pub fn interact_pressed(&self) -> bool {
        self.input.interact && !self.previous_input.interact
    }

    /// Re-read the player's position and box from the world.
    pub fn refresh_player(&mut self, world: &World) {
        let player = self.player.filter(|&p| world.is_alive(p));
        self.player_position = player.and_then(|p| world.get::<WorldPosition>(p).copied());
        self.player_bounds = match (player, self.player_position) {
            (Some(p), Some(pos)) => Some(
                world
                    .get::<BoundingBox>(p)
                    .copied()
                    .unwrap_or(BoundingBox::UNIT)
                    .to_world_space(pos),
            ),
            _ => None,
        };
    }

    /// Whether `tick` is odd, for actors that only move every other frame.
    pub fn is_odd_frame(&self) -> bool {
        self.tick % 2 == 1
    }
}

// ---------------------------------------------------------------------------
// GlobalDependencies
// ---------------------------------------------------------------------------

/// Services shared by all systems during one tick.
pub struct GlobalDependencies<'a> {
    pub collision_checker: &'a CollisionChecker<'a>,
    pub rng: &'a mut GameRng,
    pub factory: &'a mut dyn EntityFactory,
    pub player: &'a mut PlayerModel,
    pub config: &'a SimConfig,
    pub events: &'a mut EventBus,
}

impl GlobalDependencies<'_> {
    /// Deliver `event` to every subscriber before returning.
    ///
    /// Subscribers run in a fixed order: behavior handlers, lifetime,
    /// item containers, player interaction, then external observers.
    /// Events emitted by a subscriber are queued and delivered after the
    /// current one.
    pub fn emit(&mut self, state: &GlobalState, world: &mut World, event: GameEvent) {
        tracing::trace!(tick = state.tick, ?event, "event emitted");
        self.events.pending.push_back(event);
        if self.events.delivering {
            return;
        }

        self.events.delivering = true;
        while let Some(event) = self.events.pending.pop_front() {
            behavior::handle_event(self, state, world, &event);
            lifetime::handle_event(self, world, &event);
            items::handle_event(self, state, world, &event);
            interaction::handle_event(state, world, &event);
            self.events.notify_observers(&event);
            self.events.record(event);
        }
        self.events.delivering = false;
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------
