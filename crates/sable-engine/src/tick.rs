//! Fixed-timestep simulation scheduler.
//!
//! The [`Simulation`] owns the world, the map, the RNG, the entity factory
//! and the player model, and advances them one tick at a time. Each tick
//! runs the phases of [`PHASE_ORDER`] start to finish:
//!
//! 1. Activation toggles [`Active`](crate::components::Active) around the
//!    camera.
//! 2. Interaction handles a fresh interact press (teleporters).
//! 3. Behaviors run every active actor's state machine.
//! 4. Physics phase 1 integrates every active moving body.
//! 5. Item collection, player damage, damage infliction and lifetimes react
//!    to the new positions and may spawn or destroy entities.
//! 6. Physics phase 2 integrates bodies spawned since phase 1 started,
//!    including those spawned by phase 1's own collision events.
//! 7. The destruction sweep reclaims destroyed entities.
//!
//! The order never depends on entity count or content, every traversal is
//! in creation order and all randomness comes from the seeded
//! [`GameRng`], so the same initial state plus the same inputs always yields
//! the same final state.
//!
//! # Example
//!
//! ```
//! use sable_engine::prelude::*;
//!
//! let map = GridMap::from_ascii(&[
//!     "..........",
//!     "..........",
//!     "..........",
//!     "##########",
//! ])
//! .unwrap();
//! let mut sim =
//!     Simulation::with_standard_factory(Box::new(map), SimConfig::default()).unwrap();
//! sim.spawn_player(Vector::new(1, 1));
//! let walker = sim.create_actor(ActorKind::SimpleWalker, Vector::new(6, 2));
//!
//! sim.run_ticks(10, &InputFrame::default());
//!
//! assert_eq!(sim.tick_count(), 10);
//! assert!(sim.world().is_alive(walker));
//! ```

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use sable_ecs::entity::EntityId;
use sable_ecs::world::World;

use crate::activation::{self, ActivationStats};
use crate::behavior;
use crate::collision::CollisionChecker;
use crate::components::{
    ActivationPolicy, ActivationSettings, BoundingBox, Player, Vector, WorldPosition,
};
use crate::config::SimConfig;
use crate::context::{GlobalDependencies, GlobalState};
use crate::error::EngineError;
use crate::events::{EventBus, GameEvent};
use crate::factory::{ActorKind, EntityFactory, StandardFactory};
use crate::map::TileMap;
use crate::physics;
use crate::player::PlayerModel;
use crate::rng::GameRng;
use crate::systems::{damage, interaction, items, lifetime};

/// Hit box of the player entity.
pub const PLAYER_BOUNDS: BoundingBox = BoundingBox::new(0, 0, 3, 5);

// ---------------------------------------------------------------------------
// InputFrame
// ---------------------------------------------------------------------------

/// Player input for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub fire: bool,
    pub interact: bool,
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// One step of the per-tick schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Activation,
    Interaction,
    Behaviors,
    PhysicsPhase1,
    ItemCollection,
    PlayerDamage,
    DamageInfliction,
    LifeTime,
    PhysicsPhase2,
    DestructionSweep,
}

impl Phase {
    /// Name used in diagnostics and logs.
    pub fn name(self) -> &'static str {
        match self {
            Phase::Activation => "activation",
            Phase::Interaction => "interaction",
            Phase::Behaviors => "behaviors",
            Phase::PhysicsPhase1 => "physics_phase1",
            Phase::ItemCollection => "item_collection",
            Phase::PlayerDamage => "player_damage",
            Phase::DamageInfliction => "damage_infliction",
            Phase::LifeTime => "lifetime",
            Phase::PhysicsPhase2 => "physics_phase2",
            Phase::DestructionSweep => "destruction_sweep",
        }
    }
}

/// The fixed phase order of every tick.
pub const PHASE_ORDER: [Phase; 10] = [
    Phase::Activation,
    Phase::Interaction,
    Phase::Behaviors,
    Phase::PhysicsPhase1,
    Phase::ItemCollection,
    Phase::PlayerDamage,
    Phase::DamageInfliction,
    Phase::LifeTime,
    Phase::PhysicsPhase2,
    Phase::DestructionSweep,
];

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Timing and counters for the last tick.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Wall-clock time per phase, in execution order.
    pub phase_times: Vec<(Phase, Duration)>,
    /// Total time for the tick.
    pub total_time: Duration,
    pub activation: ActivationStats,
    /// Bodies moved by physics phase 1.
    pub phase1_integrated: usize,
    /// Bodies moved by physics phase 2.
    pub phase2_integrated: usize,
    /// Entities reclaimed by the destruction sweep.
    pub destroyed: usize,
    pub events_emitted: usize,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// The deterministic simulation core.
pub struct Simulation {
    world: World,
    map: Box<dyn TileMap>,
    config: SimConfig,
    rng: GameRng,
    factory: Box<dyn EntityFactory>,
    player_model: PlayerModel,
    player: Option<EntityId>,
    /// Top-left corner of the viewport.
    camera: Vector,
    /// Input of the previous tick, for edge-triggered actions.
    last_input: InputFrame,
    events: EventBus,
    tick_counter: u64,
    last_diagnostics: TickDiagnostics,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick_counter", &self.tick_counter)
            .field("entities", &self.world.entity_count())
            .field("player", &self.player)
            .field("camera", &self.camera)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Create a simulation over `map`.
    ///
    /// The tick counter starts at 0 and the RNG is seeded from
    /// `config.rng_seed`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if `config` fails validation.
    pub fn new(
        map: Box<dyn TileMap>,
        config: SimConfig,
        factory: Box<dyn EntityFactory>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let mut world = World::new();
        crate::register_components(&mut world);
        Ok(Self {
            world,
            map,
            rng: GameRng::new(config.rng_seed),
            factory,
            player_model: PlayerModel::new(config.player_max_health),
            player: None,
            camera: Vector::default(),
            last_input: InputFrame::default(),
            events: EventBus::new(),
            tick_counter: 0,
            last_diagnostics: TickDiagnostics::default(),
            config,
        })
    }

    /// [`new`](Self::new) with the built-in [`StandardFactory`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if `config` fails validation.
    pub fn with_standard_factory(
        map: Box<dyn TileMap>,
        config: SimConfig,
    ) -> Result<Self, EngineError> {
        Self::new(map, config, Box::new(StandardFactory::new()))
    }

    /// Place the player entity, replacing any previous one.
    pub fn spawn_player(&mut self, position: WorldPosition) -> EntityId {
        if let Some(old) = self.player.take() {
            self.world.destroy(old);
        }
        let player = self.world.spawn((
            Player,
            position,
            PLAYER_BOUNDS,
            ActivationSettings::new(ActivationPolicy::Always),
        ));
        self.player = Some(player);
        player
    }

    /// Place an actor through the factory.
    pub fn create_actor(&mut self, kind: ActorKind, position: WorldPosition) -> EntityId {
        self.factory.create_actor(&mut self.world, kind, position)
    }

    /// Move the camera; takes effect at the next activation phase.
    pub fn set_camera(&mut self, camera: Vector) {
        self.camera = camera;
    }

    /// Register a read-only observer for every event.
    pub fn subscribe(&mut self, observer: impl FnMut(&GameEvent) + 'static) {
        self.events.subscribe(observer);
    }

    /// Execute one simulation tick and return the events it emitted, in
    /// delivery order.
    pub fn tick(&mut self, input: &InputFrame) -> Vec<GameEvent> {
        let tick_start = Instant::now();
        let mut phase_times = Vec::with_capacity(PHASE_ORDER.len());
        let mut diagnostics = TickDiagnostics::default();

        let mut state = GlobalState::new(self.tick_counter, self.camera, *input, self.player)
            .with_previous_input(self.last_input);
        state.refresh_player(&self.world);

        let checker = CollisionChecker::new(self.map.as_ref());
        let mut deps = GlobalDependencies {
            collision_checker: &checker,
            rng: &mut self.rng,
            factory: self.factory.as_mut(),
            player: &mut self.player_model,
            config: &self.config,
            events: &mut self.events,
        };
        let world = &mut self.world;
        let mut marker = world.spawn_marker();

        for phase in PHASE_ORDER {
            let phase_start = Instant::now();
            match phase {
                Phase::Activation => {
                    diagnostics.activation = activation::update(&mut deps, &state, world);
                }
                Phase::Interaction => {
                    interaction::update(&mut deps, &state, world);
                    state.refresh_player(world);
                }
                Phase::Behaviors => behavior::update_behaviors(&mut deps, &state, world),
                Phase::PhysicsPhase1 => {
                    // Taken before integrating, so bodies spawned by this
                    // phase's collision subscribers still move in phase 2.
                    marker = world.spawn_marker();
                    diagnostics.phase1_integrated =
                        physics::update_phase1(&mut deps, &state, world);
                }
                Phase::ItemCollection => items::collect_items(&mut deps, &state, world),
                Phase::PlayerDamage => damage::update_player_damage(&mut deps, &state, world),
                Phase::DamageInfliction => damage::inflict_damage(&mut deps, &state, world),
                Phase::LifeTime => lifetime::update(world),
                Phase::PhysicsPhase2 => {
                    diagnostics.phase2_integrated =
                        physics::update_phase2(&mut deps, &state, world, marker);
                }
                Phase::DestructionSweep => diagnostics.destroyed = world.sweep_destroyed(),
            }
            phase_times.push((phase, phase_start.elapsed()));
        }

        let events = self.events.take_emitted();
        self.tick_counter += 1;
        self.last_input = *input;

        diagnostics.phase_times = phase_times;
        diagnostics.total_time = tick_start.elapsed();
        diagnostics.events_emitted = events.len();
        tracing::debug!(
            tick = state.tick,
            events = events.len(),
            destroyed = diagnostics.destroyed,
            entities = self.world.entity_count(),
            "tick complete"
        );
        self.last_diagnostics = diagnostics;
        events
    }

    /// Run `count` ticks with the same input. Returns the total number of
    /// events emitted.
    pub fn run_ticks(&mut self, count: u64, input: &InputFrame) -> usize {
        (0..count).map(|_| self.tick(input).len()).sum()
    }

    // -- accessors ----------------------------------------------------------

    /// The number of ticks executed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// The current simulation time in seconds.
    ///
    /// Computed as `tick_count * fixed_dt` to avoid floating-point drift from
    /// repeated addition.
    pub fn sim_time(&self) -> f64 {
        self.tick_counter as f64 * self.config.fixed_dt
    }

    pub fn fixed_dt(&self) -> f64 {
        self.config.fixed_dt
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, for level setup and tests.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn map(&self) -> &dyn TileMap {
        self.map.as_ref()
    }

    pub fn camera(&self) -> Vector {
        self.camera
    }

    /// Input passed to the most recent tick.
    pub fn last_input(&self) -> InputFrame {
        self.last_input
    }

    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    pub fn player_model(&self) -> &PlayerModel {
        &self.player_model
    }

    pub fn player_model_mut(&mut self) -> &mut PlayerModel {
        &mut self.player_model
    }

    pub fn rng(&self) -> &GameRng {
        &self.rng
    }

    /// Diagnostics from the last tick.
    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
