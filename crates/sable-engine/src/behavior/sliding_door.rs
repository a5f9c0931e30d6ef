//! Sliding door: a mechanism that opens while the player is near.

use serde::Serialize;

use sable_ecs::entity::EntityId;
use sable_ecs::world::World;

use crate::behavior::Behavior;
use crate::components::WorldPosition;
use crate::context::{GlobalDependencies, GlobalState};
use crate::events::{GameEvent, SoundId};

/// Ticks an opening or closing animation takes.
pub const TRANSITION_TICKS: u32 = 4;

/// Horizontal distance, in tiles, at which the door reacts to the player.
pub const TRIGGER_DISTANCE: i32 = 5;

/// Vertical distance, in tiles, at which the door reacts to the player.
const TRIGGER_HEIGHT: i32 = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum DoorState {
    #[default]
    Closed,
    Opening {
        frame: u32,
    },
    Open,
    Closing {
        frame: u32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlidingDoor {
    pub state: DoorState,
}

impl SlidingDoor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.state == DoorState::Open
    }
}

fn player_in_range(state: &GlobalState, door: WorldPosition) -> bool {
    state.player_position.is_some_and(|player| {
        (player.x - door.x).abs() <= TRIGGER_DISTANCE && (player.y - door.y).abs() <= TRIGGER_HEIGHT
    })
}

impl Behavior for SlidingDoor {
    fn update(
        &mut self,
        deps: &mut GlobalDependencies<'_>,
        state: &GlobalState,
        is_on_screen: bool,
        world: &mut World,
        entity: EntityId,
    ) {
        let near = player_in_range(state, *world.component::<WorldPosition>(entity));
        let next = match self.state {
            DoorState::Closed if near => DoorState::Opening { frame: 0 },
            DoorState::Open if !near => DoorState::Closing { frame: 0 },
            DoorState::Opening { frame } if frame + 1 >= TRANSITION_TICKS => DoorState::Open,
            DoorState::Opening { frame } => DoorState::Opening { frame: frame + 1 },
            DoorState::Closing { frame } if frame + 1 >= TRANSITION_TICKS => DoorState::Closed,
            DoorState::Closing { frame } => DoorState::Closing { frame: frame + 1 },
            unchanged => unchanged,
        };

        let starts_moving = matches!(
            next,
            DoorState::Opening { frame: 0 } | DoorState::Closing { frame: 0 }
        ) && next != self.state;
        if starts_moving {
            tracing::debug!(entity = %entity, from = ?self.state, to = ?next, "door starts moving");
            if is_on_screen {
                deps.emit(
                    state,
                    world,
                    GameEvent::PlaySound {
                        sound: SoundId::SlidingDoor,
                    },
                );
            }
        }
        self.state = next;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
