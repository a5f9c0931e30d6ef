//! Spike ball: a bouncing hazard.
//!
//! The jump arc is scripted with a [`MovementSequence`]; horizontal motion
//! comes from the body's velocity, which walls and shots flip. The ball
//! takes its first jump the moment it is first activated.

use serde::Serialize;

use sable_ecs::entity::EntityId;
use sable_ecs::world::World;

use crate::behavior::Behavior;
use crate::collision::CollisionSides;
use crate::components::{
    Active, BoundingBox, MovementSequence, MovingBody, Vector, Velocity, WorldPosition,
};
use crate::context::{GlobalDependencies, GlobalState};
use crate::events::{GameEvent, SoundId};

pub const JUMP_ARC: &[Vector] = &[
    Vector::new(0, -2),
    Vector::new(0, -2),
    Vector::new(0, -1),
    Vector::new(0, -1),
    Vector::new(0, -1),
];

const JUMP_COOLDOWN: u32 = 9;
const CEILING_COOLDOWN: u32 = 3;

/// Attach a fresh jump arc, replacing any arc in progress.
pub fn start_jump(world: &mut World, entity: EntityId) {
    world.add(entity, MovementSequence::new(JUMP_ARC, false, false));
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpikeBall {
    pub jump_back_cooldown: u32,
}

impl SpikeBall {
    pub fn new() -> Self {
        Self::default()
    }

    fn play_sound_if_visible(
        deps: &mut GlobalDependencies<'_>,
        state: &GlobalState,
        world: &mut World,
        entity: EntityId,
    ) {
        if world.get::<Active>(entity).is_some_and(|a| a.on_screen) {
            deps.emit(
                state,
                world,
                GameEvent::PlaySound {
                    sound: SoundId::DukeJumping,
                },
            );
        }
    }

    fn hit_ceiling(
        &mut self,
        deps: &mut GlobalDependencies<'_>,
        state: &GlobalState,
        world: &mut World,
        entity: EntityId,
    ) {
        self.jump_back_cooldown = CEILING_COOLDOWN;
        world.remove::<MovementSequence>(entity);
        world.component_mut::<MovingBody>(entity).velocity.y = 0.0;
        Self::play_sound_if_visible(deps, state, world, entity);
    }

    fn jump(
        &mut self,
        deps: &mut GlobalDependencies<'_>,
        state: &GlobalState,
        world: &mut World,
        entity: EntityId,
    ) {
        if self.jump_back_cooldown > 0 {
            return;
        }
        self.jump_back_cooldown = JUMP_COOLDOWN;
        start_jump(world, entity);
        // A fresh arc runs in this tick's phase 1, so its first step needs
        // the same ceiling check as one already in flight.
        if Self::arc_blocked(deps, world, entity) {
            self.hit_ceiling(deps, state, world, entity);
        } else {
            Self::play_sound_if_visible(deps, state, world, entity);
        }
    }

    /// Whether the next step of the running arc would go into the ceiling.
    fn arc_blocked(deps: &GlobalDependencies<'_>, world: &World, entity: EntityId) -> bool {
        let Some(sequence) = world.get::<MovementSequence>(entity) else {
            return false;
        };
        let Some(&step) = sequence.steps.get(sequence.cursor) else {
            return false;
        };
        let position = *world.component::<WorldPosition>(entity);
        let bbox = *world.component::<BoundingBox>(entity);
        !deps.collision_checker.can_move(position, &bbox, step)
    }
}

impl Behavior for SpikeBall {
    fn update(
        &mut self,
        deps: &mut GlobalDependencies<'_>,
        state: &GlobalState,
        _is_on_screen: bool,
        world: &mut World,
        entity: EntityId,
    ) {
        self.jump_back_cooldown = self.jump_back_cooldown.saturating_sub(1);

        if Self::arc_blocked(deps, world, entity) {
            self.hit_ceiling(deps, state, world, entity);
        }

        let position = *world.component::<WorldPosition>(entity);
        let bbox = *world.component::<BoundingBox>(entity);
        if self.jump_back_cooldown == 0
            && deps.collision_checker.is_on_solid_ground(position, &bbox)
        {
            self.jump(deps, state, world, entity);
        }
    }

    fn on_collision(
        &mut self,
        deps: &mut GlobalDependencies<'_>,
        state: &GlobalState,
        sides: CollisionSides,
        world: &mut World,
        entity: EntityId,
    ) {
        let body = world.component_mut::<MovingBody>(entity);
        if sides.left {
            body.velocity.x = 1.0;
        } else if sides.right {
            body.velocity.x = -1.0;
        }
        if sides.top {
            self.hit_ceiling(deps, state, world, entity);
        }
    }

    fn on_damage(
        &mut self,
        _deps: &mut GlobalDependencies<'_>,
        _state: &GlobalState,
        inflictor_velocity: Velocity,
        world: &mut World,
        entity: EntityId,
    ) {
        let body = world.component_mut::<MovingBody>(entity);
        body.velocity.x = if inflictor_velocity.x > 0.0 { 1.0 } else { -1.0 };
    }

    fn on_activated(
        &mut self,
        deps: &mut GlobalDependencies<'_>,
        state: &GlobalState,
        first_activation: bool,
        world: &mut World,
        entity: EntityId,
    ) {
        if first_activation {
            self.jump(deps, state, world, entity);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
