//! Rigelatin soldier: a hopping enemy.
//!
//! ```text
//!   Ready --(counter hits 0)--> Jumping --(lands, moved)--> Ready
//!                                  ^  \
//!                                  |   (lands, stuck)
//!                                  |     v
//!                                  +-- Waiting (random duration)
//! ```
//!
//! A jump stopped by a low ceiling at take-off never produces a landing
//! collision; the soldier notices it is back on the ground and treats it as
//! a stuck landing.

use serde::Serialize;

use sable_ecs::entity::EntityId;
use sable_ecs::world::World;

use crate::behavior::Behavior;
use crate::collision::CollisionSides;
use crate::components::{BoundingBox, MovingBody, Orientation, Velocity, WorldPosition};
use crate::context::{GlobalDependencies, GlobalState};
use crate::movement::MovementResult;

/// Updates spent in `Ready` before jumping.
pub const DECISION_TICKS: u32 = 3;

const JUMP_SPEED_X: f32 = 1.0;
const JUMP_SPEED_Y: f32 = -3.0;

/// Range of ticks spent in `Waiting`, upper bound exclusive.
const WAIT_TICKS: (i32, i32) = (2, 6);

/// A jump back on the ground within this many updates never got airborne.
const ABORTED_JUMP_TICKS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoldierState {
    Ready,
    Jumping {
        frames_elapsed: u32,
        last_horizontal_result: MovementResult,
        previous_pos_x: i32,
    },
    Waiting {
        frames_elapsed: u32,
        duration: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RigelatinSoldier {
    pub state: SoldierState,
    pub decision_counter: u32,
    pub orientation: Orientation,
}

impl Default for RigelatinSoldier {
    fn default() -> Self {
        Self::new()
    }
}

impl RigelatinSoldier {
    pub fn new() -> Self {
        Self {
            state: SoldierState::Ready,
            decision_counter: DECISION_TICKS,
            orientation: Orientation::Left,
        }
    }

    fn start_jump(&mut self, state: &GlobalState, world: &mut World, entity: EntityId) {
        let position = *world.component::<WorldPosition>(entity);
        if let Some(player) = state.player_position {
            self.orientation = if player.x < position.x {
                Orientation::Left
            } else {
                Orientation::Right
            };
        }

        let body = world.component_mut::<MovingBody>(entity);
        body.velocity = Velocity::new(
            self.orientation.to_movement() as f32 * JUMP_SPEED_X,
            JUMP_SPEED_Y,
        );

        tracing::debug!(entity = %entity, orientation = ?self.orientation, "soldier jumps");
        self.state = SoldierState::Jumping {
            frames_elapsed: 0,
            last_horizontal_result: MovementResult::Failed,
            previous_pos_x: position.x,
        };
    }

    /// Stop moving and decide between another jump and a pause.
    fn land(
        &mut self,
        deps: &mut GlobalDependencies<'_>,
        world: &mut World,
        entity: EntityId,
        last_horizontal_result: MovementResult,
    ) {
        world.component_mut::<MovingBody>(entity).velocity.x = 0.0;
        self.state = if last_horizontal_result == MovementResult::Failed {
            let duration = deps.rng.gen_range(WAIT_TICKS.0, WAIT_TICKS.1) as u32;
            tracing::debug!(entity = %entity, duration, "soldier stuck, waiting");
            SoldierState::Waiting {
                frames_elapsed: 0,
                duration,
            }
        } else {
            SoldierState::Ready
        };
    }

    fn resting_on_ground(deps: &GlobalDependencies<'_>, world: &World, entity: EntityId) -> bool {
        let position = *world.component::<WorldPosition>(entity);
        let bbox = *world.component::<BoundingBox>(entity);
        world.component::<MovingBody>(entity).velocity.y == 0.0
            && deps.collision_checker.is_on_solid_ground(position, &bbox)
    }
}

impl Behavior for RigelatinSoldier {
    fn update(
        &mut self,
        deps: &mut GlobalDependencies<'_>,
        state: &GlobalState,
        _is_on_screen: bool,
        world: &mut World,
        entity: EntityId,
    ) {
        let mut quiet_landing = None;
        match &mut self.state {
            SoldierState::Ready => {
                self.decision_counter = self.decision_counter.saturating_sub(1);
                if self.decision_counter == 0 {
                    self.decision_counter = DECISION_TICKS;
                    self.start_jump(state, world, entity);
                }
            }
            SoldierState::Jumping {
                frames_elapsed,
                last_horizontal_result,
                previous_pos_x,
            } => {
                let x = world.component::<WorldPosition>(entity).x;
                *frames_elapsed += 1;
                *last_horizontal_result = if x == *previous_pos_x {
                    MovementResult::Failed
                } else {
                    MovementResult::Completed
                };
                *previous_pos_x = x;
                if Self::resting_on_ground(deps, world, entity) {
                    quiet_landing = Some(if *frames_elapsed <= ABORTED_JUMP_TICKS {
                        MovementResult::Failed
                    } else {
                        *last_horizontal_result
                    });
                }
            }
            SoldierState::Waiting {
                frames_elapsed,
                duration,
            } => {
                *frames_elapsed += 1;
                if *frames_elapsed >= *duration {
                    self.start_jump(state, world, entity);
                }
            }
        }
        if let Some(result) = quiet_landing {
            tracing::debug!(entity = %entity, "soldier jump ended without a landing");
            self.land(deps, world, entity, result);
        }
    }

    fn on_collision(
        &mut self,
        deps: &mut GlobalDependencies<'_>,
        _state: &GlobalState,
        sides: CollisionSides,
        world: &mut World,
        entity: EntityId,
    ) {
        let SoldierState::Jumping {
            last_horizontal_result,
            ..
        } = self.state
        else {
            return;
        };
        if sides.bottom {
            self.land(deps, world, entity, last_horizontal_result);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
