//! Collision-checked movement helpers for behaviors.
//!
//! Behaviors that walk move their entity directly instead of going
//! through [`MovingBody`](crate::components::MovingBody) velocity; these
//! helpers apply such a move through [`CollisionChecker::sweep_move`] and
//! report how much of it happened.

use serde::Serialize;

use sable_ecs::entity::EntityId;
use sable_ecs::world::World;

use crate::collision::CollisionChecker;
use crate::components::{BoundingBox, Vector, WorldPosition};

/// How much of a requested move was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MovementResult {
    /// Blocked before moving a single tile.
    Failed,
    Completed,
    MovedPartially,
}

fn classify(requested: i32, moved: i32) -> MovementResult {
    if moved == requested {
        MovementResult::Completed
    } else if moved == 0 {
        MovementResult::Failed
    } else {
        MovementResult::MovedPartially
    }
}

fn move_entity(
    checker: &CollisionChecker<'_>,
    world: &mut World,
    entity: EntityId,
    delta: Vector,
) -> Vector {
    let position = *world.component::<WorldPosition>(entity);
    let bbox = world.get::<BoundingBox>(entity).copied().unwrap_or(BoundingBox::UNIT);
    let moved = checker.sweep_move(position, &bbox, delta).delta;
    *world.component_mut::<WorldPosition>(entity) += moved;
    moved
}

/// Move `entity` horizontally by `amount` tiles, stopping at walls.
///
/// # Panics
///
/// Panics if the entity has no [`WorldPosition`].
pub fn move_horizontally(
    checker: &CollisionChecker<'_>,
    world: &mut World,
    entity: EntityId,
    amount: i32,
) -> MovementResult {
    let moved = move_entity(checker, world, entity, Vector::new(amount, 0));
    classify(amount, moved.x)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::GridMap;

    fn world_with_walker(x: i32, y: i32) -> (World, EntityId) {
        let mut world = World::new();
        world.register_component::<WorldPosition>("world_position");
        world.register_component::<BoundingBox>("bounding_box");
        let e = world.spawn((Vector::new(x, y), BoundingBox::UNIT));
        (world, e)
    }

    #[test]
    fn results_classified() {
        let map = GridMap::from_ascii(&["#....#"]).unwrap();
        let checker = CollisionChecker::new(&map);
        let (mut world, e) = world_with_walker(2, 0);

        assert_eq!(
            move_horizontally(&checker, &mut world, e, 1),
            MovementResult::Completed
        );
        assert_eq!(world.component::<WorldPosition>(e).x, 3);
        assert_eq!(
            move_horizontally(&checker, &mut world, e, 3),
            MovementResult::MovedPartially
        );
        assert_eq!(world.component::<WorldPosition>(e).x, 4);
        assert_eq!(
            move_horizontally(&checker, &mut world, e, 1),
            MovementResult::Failed
        );
        assert_eq!(
            move_horizontally(&checker, &mut world, e, 0),
            MovementResult::Completed
        );
    }

    #[test]
    fn leftward_moves_stop_at_the_wall() {
        let map = GridMap::from_ascii(&["#....#"]).unwrap();
        let checker = CollisionChecker::new(&map);
        let (mut world, e) = world_with_walker(3, 0);
        assert_eq!(
            move_horizontally(&checker, &mut world, e, -5),
            MovementResult::MovedPartially
        );
        assert_eq!(world.component::<WorldPosition>(e).x, 1);
    }
}
