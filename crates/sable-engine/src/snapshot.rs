//! Simulation snapshots with BLAKE3 hashing.
//!
//! [`SimulationSnapshot`] is a serializable picture of everything that
//! affects future ticks: the ECS world, the tick counter, the RNG position,
//! the player model, the camera and the last input. Its `hash` is a BLAKE3 digest of the
//! canonical JSON form of those parts, so two simulations are in the same
//! state exactly when their hashes match.
//!
//! ```
//! use sable_engine::prelude::*;
//!
//! let map = GridMap::empty(40, 20);
//! let mut sim =
//!     Simulation::with_standard_factory(Box::new(map), SimConfig::default()).unwrap();
//! sim.run_ticks(10, &InputFrame::default());
//!
//! let snapshot = sim.capture_snapshot().unwrap();
//! assert_eq!(snapshot.tick_counter, 10);
//! assert_eq!(snapshot.hash.len(), 64);
//! assert_eq!(snapshot.hash, sim.state_hash().unwrap());
//! ```
//!
//! The map, the factory, event observers and diagnostics are not part of the
//! snapshot. The map is immutable and the rest does not feed back into the
//! simulation.

use sable_ecs::snapshot::WorldSnapshot;
use serde::Serialize;

use crate::components::Vector;
use crate::error::EngineError;
use crate::player::PlayerModel;
use crate::tick::{InputFrame, Simulation};

// ---------------------------------------------------------------------------
// SimulationSnapshot
// ---------------------------------------------------------------------------

/// Serializable state of a [`Simulation`] at a tick boundary.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSnapshot {
    /// Every live entity with its components.
    pub world: WorldSnapshot,
    /// Number of ticks executed at the time of capture.
    pub tick_counter: u64,
    pub rng_seed: u64,
    /// Number of random values drawn so far.
    pub rng_cursor: u64,
    pub player: PlayerModel,
    pub camera: Vector,
    /// Input of the last tick, which decides what counts as a new press.
    pub last_input: InputFrame,
    /// BLAKE3 hex digest (64 lowercase hex chars) of the fields above.
    pub hash: String,
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HashableState<'a> {
    world: &'a WorldSnapshot,
    tick_counter: u64,
    rng_seed: u64,
    rng_cursor: u64,
    player: &'a PlayerModel,
    camera: Vector,
    last_input: InputFrame,
}

impl<'a> HashableState<'a> {
    fn of(sim: &'a Simulation, world: &'a WorldSnapshot) -> Self {
        Self {
            world,
            tick_counter: sim.tick_count(),
            rng_seed: sim.rng().seed(),
            rng_cursor: sim.rng().cursor(),
            player: sim.player_model(),
            camera: sim.camera(),
            last_input: sim.last_input(),
        }
    }
}

fn compute_hash(hashable: &HashableState<'_>) -> Result<String, EngineError> {
    let json_bytes = serde_json::to_vec(hashable).map_err(|source| EngineError::Serialize {
        what: "simulation state",
        source,
    })?;
    Ok(blake3::hash(&json_bytes).to_hex().to_string())
}

// ---------------------------------------------------------------------------
// Simulation snapshot methods
// ---------------------------------------------------------------------------

impl Simulation {
    /// Capture the current state and its hash.
    ///
    /// # Errors
    ///
    /// [`EngineError::Serialize`] if a component fails to serialize.
    pub fn capture_snapshot(&self) -> Result<SimulationSnapshot, EngineError> {
        let world = self.world().capture_snapshot();
        let hash = compute_hash(&HashableState::of(self, &world))?;

        tracing::debug!(tick = self.tick_count(), hash = %hash, "snapshot captured");
        Ok(SimulationSnapshot {
            world,
            tick_counter: self.tick_count(),
            rng_seed: self.rng().seed(),
            rng_cursor: self.rng().cursor(),
            player: self.player_model().clone(),
            camera: self.camera(),
            last_input: self.last_input(),
            hash,
        })
    }

    /// BLAKE3 hex digest of the current state.
    ///
    /// # Errors
    ///
    /// [`EngineError::Serialize`] if a component fails to serialize.
    pub fn state_hash(&self) -> Result<String, EngineError> {
        let world = self.world().capture_snapshot();
        compute_hash(&HashableState::of(self, &world))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::factory::ActorKind;
    use crate::map::GridMap;
    use crate::tick::InputFrame;

    fn level(seed: u64) -> Simulation {
        let map = GridMap::from_ascii(&[
            "........................",
            "........................",
            "........................",
            "........................",
            "........................",
            "........................",
            "........................",
            "........................",
            "########################",
        ])
        .unwrap();
        let config = SimConfig {
            rng_seed: seed,
            ..SimConfig::default()
        };
        let mut sim = Simulation::with_standard_factory(Box::new(map), config).unwrap();
        sim.spawn_player(Vector::new(1, 3));
        sim.create_actor(ActorKind::RigelatinSoldier, Vector::new(10, 5));
        sim.create_actor(ActorKind::SimpleWalker, Vector::new(16, 7));
        sim
    }

    #[test]
    fn hash_is_64_hex_chars() {
        let hash = level(1).state_hash().unwrap();
        assert_eq!(hash.len(), 64);
        let lower_hex = |c: char| c.is_ascii_hexdigit() && !c.is_ascii_uppercase();
        assert!(hash.chars().all(lower_hex));
    }

    #[test]
    fn snapshot_hash_matches_state_hash() {
        let mut sim = level(1);
        sim.run_ticks(5, &InputFrame::default());
        let snapshot = sim.capture_snapshot().unwrap();
        assert_eq!(snapshot.hash, sim.state_hash().unwrap());
        assert_eq!(snapshot.tick_counter, 5);
        assert_eq!(snapshot.world.entities.len(), sim.world().entity_count());
    }

    #[test]
    fn same_inputs_same_hash() {
        let mut a = level(3);
        let mut b = level(3);
        for _ in 0..120 {
            a.tick(&InputFrame::default());
            b.tick(&InputFrame::default());
        }
        assert_eq!(a.state_hash().unwrap(), b.state_hash().unwrap());
    }

    #[test]
    fn hash_changes_when_state_changes() {
        let mut sim = level(3);
        let before = sim.state_hash().unwrap();
        sim.tick(&InputFrame::default());
        assert_ne!(before, sim.state_hash().unwrap());
    }

    #[test]
    fn held_input_is_part_of_the_state() {
        let mut a = level(3);
        let mut b = level(3);
        a.tick(&InputFrame {
            interact: true,
            ..Default::default()
        });
        b.tick(&InputFrame::default());
        assert!(a.last_input().interact);
        assert_ne!(a.state_hash().unwrap(), b.state_hash().unwrap());
    }

    #[test]
    fn camera_is_part_of_the_state() {
        let mut a = level(3);
        let b = level(3);
        a.set_camera(Vector::new(1, 0));
        assert_ne!(a.state_hash().unwrap(), b.state_hash().unwrap());
    }
}
