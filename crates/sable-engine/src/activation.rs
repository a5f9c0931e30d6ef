//! Activation: which entities are simulated this tick.
//!
//! The simulated region is the viewport expanded by
//! [`SimConfig::activation_margin`] tiles on every side. An entity whose box
//! touches the region carries [`Active`]; everything else is dormant and
//! skipped by every gameplay system. Deactivation only removes the marker,
//! so an entity that comes back resumes with exactly the state it left with.

use sable_ecs::world::World;

use crate::components::{
    ActivationPolicy, ActivationSettings, Active, AutoDestroy, BoundingBox, Vector, WorldPosition,
};
use crate::config::SimConfig;
use crate::context::{GlobalDependencies, GlobalState};
use crate::events::GameEvent;
use crate::systems::world_box;

/// Counts from one activation pass, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivationStats {
    pub activated: usize,
    pub deactivated: usize,
    pub destroyed: usize,
}

/// The visible part of the map.
pub fn viewport(camera: Vector, config: &SimConfig) -> BoundingBox {
    let (width, height) = (config.viewport_width, config.viewport_height);
    BoundingBox::new(camera.x, camera.y, width, height)
}

/// The viewport plus the activation margin.
pub fn active_region(camera: Vector, config: &SimConfig) -> BoundingBox {
    let margin = config.activation_margin;
    BoundingBox::new(
        camera.x - margin,
        camera.y - margin,
        config.viewport_width + 2 * margin,
        config.viewport_height + 2 * margin,
    )
}

/// Toggle [`Active`] on every positioned entity for the current camera.
pub fn update(
    deps: &mut GlobalDependencies<'_>,
    state: &GlobalState,
    world: &mut World,
) -> ActivationStats {
    let region = active_region(state.camera, deps.config);
    let visible = viewport(state.camera, deps.config);
    let mut stats = ActivationStats::default();

    world.each::<(WorldPosition,)>(|world, entity| {
        let Some(bounds) = world_box(world, entity) else {
            return;
        };
        let settings = world.get::<ActivationSettings>(entity).copied();
        let in_region = match settings {
            Some(ActivationSettings {
                policy: ActivationPolicy::Always,
                ..
            }) => true,
            Some(ActivationSettings {
                policy: ActivationPolicy::AlwaysAfterFirstActivation,
                has_been_activated: true,
            }) => true,
            _ => bounds.intersects(&region),
        };
        let was_active = world.has_component::<Active>(entity);

        if in_region {
            let on_screen = bounds.intersects(&visible);
            world.add(entity, Active { on_screen });
            if was_active {
                return;
            }

            let first_activation = settings.is_some_and(|s| !s.has_been_activated);
            if let Some(settings) = world.get_mut::<ActivationSettings>(entity) {
                settings.has_been_activated = true;
            }
            stats.activated += 1;
            deps.emit(
                state,
                world,
                GameEvent::EntityActivated {
                    entity,
                    first_activation,
                },
            );
        } else if was_active {
            if world
                .get::<AutoDestroy>(entity)
                .is_some_and(|a| a.on_leaving_active_region)
            {
                world.destroy(entity);
                stats.destroyed += 1;
            } else {
                world.remove::<Active>(entity);
                stats.deactivated += 1;
            }
        }
    });

    tracing::trace!(
        tick = state.tick,
        activated = stats.activated,
        deactivated = stats.deactivated,
        destroyed = stats.destroyed,
        "activation pass"
    );
    stats
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{MovingBody, Velocity};
    use crate::context::test_support::TestBed;
    use crate::map::GridMap;
    use sable_ecs::entity::EntityId;

    fn run(bed: &mut TestBed, camera: Vector) -> Vec<GameEvent> {
        let mut state = bed.state(0);
        state.camera = camera;
        bed.run(|deps, world| update(deps, &state, world));
        bed.emitted()
    }

    fn spawn_at(bed: &mut TestBed, x: i32) -> EntityId {
        bed.world.spawn((Vector::new(x, 5), BoundingBox::UNIT))
    }

    #[test]
    fn region_is_viewport_plus_margin() {
        let config = SimConfig::default();
        let region = active_region(Vector::new(10, 10), &config);
        assert_eq!(region, BoundingBox::new(8, 8, 36, 24));
        assert_eq!(
            viewport(Vector::new(10, 10), &config),
            BoundingBox::new(10, 10, 32, 20)
        );
    }

    #[test]
    fn on_screen_distinguishes_margin_from_viewport() {
        let mut bed = TestBed::new(GridMap::empty(100, 30));
        let visible = spawn_at(&mut bed, 5);
        let margin = spawn_at(&mut bed, 33);
        let far = spawn_at(&mut bed, 60);
        run(&mut bed, Vector::new(0, 0));

        assert_eq!(
            bed.world.get::<Active>(visible),
            Some(&Active { on_screen: true })
        );
        assert_eq!(
            bed.world.get::<Active>(margin),
            Some(&Active { on_screen: false })
        );
        assert!(!bed.world.has_component::<Active>(far));
    }

    #[test]
    fn activation_is_edge_triggered_and_lossless() {
        let mut bed = TestBed::new(GridMap::empty(100, 30));
        let e = spawn_at(&mut bed, 5);
        let body = MovingBody::new(Velocity::new(0.5, -1.0), true);
        bed.world.add(e, body);
        bed.world.add(e, ActivationSettings::default());

        let events = run(&mut bed, Vector::new(0, 0));
        assert_eq!(
            events,
            vec![GameEvent::EntityActivated {
                entity: e,
                first_activation: true
            }]
        );
        assert!(run(&mut bed, Vector::new(0, 0)).is_empty());

        run(&mut bed, Vector::new(60, 0));
        assert!(!bed.world.has_component::<Active>(e));
        assert!(bed.world.is_alive(e));

        let events = run(&mut bed, Vector::new(0, 0));
        assert_eq!(
            events,
            vec![GameEvent::EntityActivated {
                entity: e,
                first_activation: false
            }]
        );
        assert_eq!(bed.world.component::<MovingBody>(e), &body);
        assert_eq!(*bed.world.component::<WorldPosition>(e), Vector::new(5, 5));
    }

    #[test]
    fn always_active_ignores_the_camera() {
        let mut bed = TestBed::new(GridMap::empty(200, 30));
        let e = spawn_at(&mut bed, 150);
        bed.world.add(e, ActivationSettings::new(ActivationPolicy::Always));
        run(&mut bed, Vector::new(0, 0));
        assert_eq!(
            bed.world.get::<Active>(e),
            Some(&Active { on_screen: false })
        );
    }

    #[test]
    fn stays_active_after_first_activation() {
        let mut bed = TestBed::new(GridMap::empty(200, 30));
        let e = spawn_at(&mut bed, 50);
        let settings = ActivationSettings::new(ActivationPolicy::AlwaysAfterFirstActivation);
        bed.world.add(e, settings);

        run(&mut bed, Vector::new(100, 0));
        assert!(!bed.world.has_component::<Active>(e));

        run(&mut bed, Vector::new(40, 0));
        assert!(bed.world.has_component::<Active>(e));

        run(&mut bed, Vector::new(150, 0));
        assert_eq!(
            bed.world.get::<Active>(e),
            Some(&Active { on_screen: false })
        );
    }

    #[test]
    fn auto_destroy_on_leaving() {
        let mut bed = TestBed::new(GridMap::empty(200, 30));
        let e = spawn_at(&mut bed, 5);
        bed.world.add(e, AutoDestroy::on_leaving_active_region());
        run(&mut bed, Vector::new(0, 0));
        assert!(bed.world.is_alive(e));
        run(&mut bed, Vector::new(100, 0));
        assert!(!bed.world.is_alive(e));
    }
}
