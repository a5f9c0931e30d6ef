//! Simple walker: paces back and forth along a floor.

use serde::Serialize;

use sable_ecs::entity::EntityId;
use sable_ecs::world::World;

use crate::behavior::Behavior;
use crate::components::{BoundingBox, Orientation, Vector, WorldPosition};
use crate::context::{GlobalDependencies, GlobalState};
use crate::movement::{move_horizontally, MovementResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleWalker {
    pub orientation: Orientation,
    /// Move every tick instead of every other tick.
    pub walk_at_full_speed: bool,
}

impl SimpleWalker {
    pub fn new(orientation: Orientation, walk_at_full_speed: bool) -> Self {
        Self {
            orientation,
            walk_at_full_speed,
        }
    }

    fn turn_around(&mut self, entity: EntityId) {
        self.orientation = self.orientation.opposite();
        tracing::trace!(entity = %entity, orientation = ?self.orientation, "walker turns");
    }
}

impl Behavior for SimpleWalker {
    fn update(
        &mut self,
        deps: &mut GlobalDependencies<'_>,
        state: &GlobalState,
        _is_on_screen: bool,
        world: &mut World,
        entity: EntityId,
    ) {
        if !self.walk_at_full_speed && !state.is_odd_frame() {
            return;
        }

        let position = *world.component::<WorldPosition>(entity);
        let bbox = world.get::<BoundingBox>(entity).copied().unwrap_or(BoundingBox::UNIT);
        let step = self.orientation.to_movement();

        if !deps.collision_checker.is_on_solid_ground(position + Vector::new(step, 0), &bbox) {
            self.turn_around(entity);
            return;
        }

        let result = move_horizontally(deps.collision_checker, world, entity, step);
        if result != MovementResult::Completed {
            self.turn_around(entity);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
