//! Self-destruction of short-lived entities.

use sable_ecs::world::World;

use crate::components::{Active, AutoDestroy, WorldPosition};
use crate::context::GlobalDependencies;
use crate::events::GameEvent;

/// Count down every active [`AutoDestroy`] timeout and destroy entities
/// whose timeout ran out.
pub fn update(world: &mut World) {
    world.each::<(AutoDestroy, Active)>(|world, entity| {
        let auto_destroy = world.component_mut::<AutoDestroy>(entity);
        let Some(ticks) = auto_destroy.timeout.as_mut() else {
            return;
        };
        *ticks = ticks.saturating_sub(1);
        if *ticks == 0 {
            world.destroy(entity);
        }
    });
}

/// Destroy entities flagged to die on their first world collision, leaving
/// a smoke puff where they hit.
pub fn handle_event(deps: &mut GlobalDependencies<'_>, world: &mut World, event: &GameEvent) {
    let GameEvent::CollidedWithWorld { entity, .. } = *event else {
        return;
    };
    if !world.get::<AutoDestroy>(entity).is_some_and(|a| a.on_world_collision) {
        return;
    }
    let position = world.get::<WorldPosition>(entity).copied();
    world.destroy(entity);
    tracing::trace!(entity = %entity, "destroyed on world collision");
    if let Some(position) = position {
        deps.factory.create_impact_smoke(world, position);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionSides;
    use crate::components::Vector;
    use crate::context::test_support::TestBed;
    use crate::factory::ImpactSmoke;
    use crate::map::GridMap;

    fn world() -> World {
        let mut world = World::new();
        crate::register_components(&mut world);
        world
    }

    #[test]
    fn timeout_counts_active_ticks_only() {
        let mut world = world();
        let e = world.spawn((Vector::new(0, 0), AutoDestroy::after_timeout(2)));

        update(&mut world);
        assert_eq!(world.component::<AutoDestroy>(e).timeout, Some(2));

        world.add(e, Active { on_screen: false });
        update(&mut world);
        assert!(world.is_alive(e));
        update(&mut world);
        assert!(!world.is_alive(e));
    }

    #[test]
    fn collision_destroys_fragile_entities_in_a_puff_of_smoke() {
        let mut bed = TestBed::new(GridMap::empty(8, 8));
        let fragile = bed.world.spawn((
            Vector::new(5, 3),
            AutoDestroy {
                on_world_collision: true,
                ..Default::default()
            },
        ));
        let sturdy = bed.world.spawn((Vector::new(1, 1), AutoDestroy::after_timeout(10)));
        for entity in [fragile, sturdy] {
            let event = GameEvent::CollidedWithWorld {
                entity,
                sides: CollisionSides::default(),
            };
            bed.run(|deps, world| handle_event(deps, world, &event));
        }
        assert!(!bed.world.is_alive(fragile));
        assert!(bed.world.is_alive(sturdy));

        let smoke: Vec<_> = bed
            .world
            .query::<(&ImpactSmoke, &WorldPosition)>()
            .map(|(_, (_, p))| *p)
            .collect();
        assert_eq!(smoke, vec![Vector::new(5, 3)]);
    }
}
