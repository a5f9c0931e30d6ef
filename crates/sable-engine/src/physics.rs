//! Tile-based physics in two phases.
//!
//! Every active [`MovingBody`] is integrated once per tick:
//!
//! 1. A [`MovementSequence`], if present, supplies the delta and is applied
//!    without collision checks. Velocity is ignored for that tick.
//! 2. Otherwise gravity is added (up to the terminal velocity), the velocity
//!    plus the carried sub-tile remainder is split into whole tiles, and the
//!    whole-tile delta is swept against the map. Blocked axes lose their
//!    velocity and a `CollidedWithWorld` event is emitted.
//!
//! [`update_phase1`] runs for all bodies. [`update_phase2`] runs later in the
//! same tick for bodies created after the phase 1 marker was taken, so
//! entities spawned by reactive systems move in the frame they appear.
//!
//! # Determinism
//!
//! Bodies are visited in creation order, all arithmetic is `f32` on values
//! that only ever take multiples of the configured gravity step, and nothing
//! depends on wall-clock time.

use sable_ecs::entity::EntityId;
use sable_ecs::world::{SpawnMarker, World};

use crate::components::{
    Active, BoundingBox, MovementSequence, MovingBody, Vector, Velocity, WorldPosition,
};
use crate::config::SimConfig;
use crate::context::{GlobalDependencies, GlobalState};
use crate::events::GameEvent;

/// System name used in diagnostics and logs.
pub const PHYSICS_SYSTEM_NAME: &str = "physics";

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Integrate every active moving body.
pub fn update_phase1(
    deps: &mut GlobalDependencies<'_>,
    state: &GlobalState,
    world: &mut World,
) -> usize {
    let mut integrated = 0;
    world.each::<(MovingBody, Active)>(|world, entity| {
        integrated += usize::from(step_body(deps, state, world, entity));
    });
    tracing::trace!(
        system = PHYSICS_SYSTEM_NAME,
        tick = state.tick,
        integrated,
        "phase 1"
    );
    integrated
}

/// Integrate the active moving bodies created since `marker`.
pub fn update_phase2(
    deps: &mut GlobalDependencies<'_>,
    state: &GlobalState,
    world: &mut World,
    marker: SpawnMarker,
) -> usize {
    let mut integrated = 0;
    world.each::<(MovingBody, Active)>(|world, entity| {
        if world.created_since(entity, marker) {
            integrated += usize::from(step_body(deps, state, world, entity));
        }
    });
    tracing::trace!(
        system = PHYSICS_SYSTEM_NAME,
        tick = state.tick,
        integrated,
        "phase 2"
    );
    integrated
}

// ---------------------------------------------------------------------------
// Integration
// ---------------------------------------------------------------------------

/// Add one tick of gravity to `body`.
///
/// A body resting on ground with no vertical speed stays at rest. Any other
/// body accelerates downward until the terminal velocity; speeds already
/// above it are left alone.
pub fn apply_gravity(body: &mut MovingBody, on_solid_ground: bool, config: &SimConfig) {
    if body.velocity.y == 0.0 && on_solid_ground {
        body.remainder.y = 0.0;
        return;
    }
    if body.velocity.y < config.terminal_velocity {
        let accelerated = body.velocity.y + config.gravity_step;
        body.velocity.y = accelerated.min(config.terminal_velocity);
    }
}

/// Split velocity plus remainder into a whole-tile step and the new
/// remainder.
fn whole_tile_step(body: &mut MovingBody) -> Vector {
    let total = Velocity::new(
        body.velocity.x + body.remainder.x,
        body.velocity.y + body.remainder.y,
    );
    let step = Vector::new(total.x.trunc() as i32, total.y.trunc() as i32);
    body.remainder = Velocity::new(total.x - step.x as f32, total.y - step.y as f32);
    step
}

/// Move one body. Returns `false` if the body is suspended.
///
/// # Panics
///
/// Panics if the entity has a [`MovingBody`] but no [`WorldPosition`] or
/// [`BoundingBox`].
fn step_body(
    deps: &mut GlobalDependencies<'_>,
    state: &GlobalState,
    world: &mut World,
    entity: EntityId,
) -> bool {
    let mut body = *world.component::<MovingBody>(entity);
    if !body.is_active {
        return false;
    }
    let position = *world.component::<WorldPosition>(entity);
    let bbox = *world.component::<BoundingBox>(entity);

    if world.has_component::<MovementSequence>(entity) {
        play_sequence(world, entity);
        return true;
    }

    if body.gravity_affected {
        let on_ground = deps.collision_checker.is_on_solid_ground(position, &bbox);
        apply_gravity(&mut body, on_ground, deps.config);
    }
    let step = whole_tile_step(&mut body);

    if body.ignore_collisions {
        *world.component_mut::<MovingBody>(entity) = body;
        *world.component_mut::<WorldPosition>(entity) += step;
        return true;
    }

    let sweep = deps.collision_checker.sweep_move(position, &bbox, step);
    if sweep.blocked.horizontal() {
        body.velocity.x = 0.0;
        body.remainder.x = 0.0;
    }
    if sweep.blocked.vertical() {
        body.velocity.y = 0.0;
        body.remainder.y = 0.0;
    }
    *world.component_mut::<MovingBody>(entity) = body;
    *world.component_mut::<WorldPosition>(entity) += sweep.delta;

    if sweep.blocked.any() {
        deps.emit(
            state,
            world,
            GameEvent::CollidedWithWorld {
                entity,
                sides: sweep.blocked,
            },
        );
    }
    true
}

/// Apply the next scripted step and advance, loop or finish the sequence.
fn play_sequence(world: &mut World, entity: EntityId) {
    let sequence = world.component_mut::<MovementSequence>(entity);
    let Some(&step) = sequence.steps.get(sequence.cursor) else {
        world.remove::<MovementSequence>(entity);
        return;
    };
    sequence.cursor += 1;

    if sequence.cursor >= sequence.steps.len() {
        if sequence.repeat {
            sequence.cursor = 0;
        } else {
            let reset_velocity = sequence.reset_velocity_after;
            world.remove::<MovementSequence>(entity);
            if reset_velocity {
                world.component_mut::<MovingBody>(entity).velocity = Velocity::default();
            }
        }
    }

    *world.component_mut::<WorldPosition>(entity) += step;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionChecker, CollisionSides};
    use crate::context::test_support::TestBed;
    use crate::map::GridMap;

    fn open_room() -> GridMap {
        GridMap::from_ascii(&[
            "..........",
            "..........",
            "..........",
            "..........",
            "..........",
            "..........",
            "..........",
            "..........",
            "##########",
            "##########",
        ])
        .unwrap()
    }

    fn body(bed: &mut TestBed, position: Vector, bbox: BoundingBox, body: MovingBody) -> EntityId {
        bed.world.spawn((position, bbox, body, Active { on_screen: true }))
    }

    fn tick(bed: &mut TestBed) -> Vec<GameEvent> {
        let state = bed.state(0);
        bed.run(|deps, world| update_phase1(deps, &state, world));
        bed.emitted()
    }

    fn is_landing(event: &GameEvent) -> bool {
        matches!(event, GameEvent::CollidedWithWorld { sides, .. } if sides.bottom)
    }

    fn resting() -> MovingBody {
        MovingBody::new(Velocity::default(), false)
    }

    fn sliding_right() -> MovingBody {
        MovingBody::new(Velocity::new(1.0, 0.0), false)
    }

    #[test]
    fn falling_box_lands_on_the_floor() {
        let mut bed = TestBed::new(open_room());
        let bbox = BoundingBox::new(0, 0, 2, 2);
        let falling = MovingBody::new(Velocity::default(), true);
        let e = body(&mut bed, Vector::new(5, 5), bbox, falling);

        let mut landings = 0;
        for _ in 0..10 {
            let events = tick(&mut bed);
            landings += events.iter().filter(|ev| is_landing(ev)).count();
            let position = *bed.world.component::<WorldPosition>(e);
            let checker = CollisionChecker::new(&bed.map);
            assert!(!checker.overlaps_solid(&bbox.to_world_space(position)));
        }

        let position = *bed.world.component::<WorldPosition>(e);
        assert_eq!(position, Vector::new(5, 6));
        let checker = CollisionChecker::new(&bed.map);
        assert!(checker.is_on_solid_ground(position, &bbox));
        assert_eq!(bed.world.component::<MovingBody>(e).velocity.y, 0.0);
        assert_eq!(landings, 1);
    }

    #[test]
    fn gravity_is_capped() {
        let mut bed = TestBed::new(GridMap::empty(4, 200));
        let falling = MovingBody::new(Velocity::default(), true);
        let e = body(&mut bed, Vector::new(1, 0), BoundingBox::UNIT, falling);
        let mut previous = 0.0;
        for _ in 0..20 {
            tick(&mut bed);
            let vy = bed.world.component::<MovingBody>(e).velocity.y;
            assert!(vy >= previous);
            assert!(vy <= bed.config.terminal_velocity);
            previous = vy;
        }
        assert_eq!(previous, bed.config.terminal_velocity);
    }

    #[test]
    fn fractional_velocity_accumulates() {
        let mut bed = TestBed::new(GridMap::empty(20, 4));
        let e = body(
            &mut bed,
            Vector::new(0, 1),
            BoundingBox::UNIT,
            MovingBody::new(Velocity::new(0.5, 0.0), false),
        );
        tick(&mut bed);
        assert_eq!(bed.world.component::<WorldPosition>(e).x, 0);
        tick(&mut bed);
        assert_eq!(bed.world.component::<WorldPosition>(e).x, 1);
        tick(&mut bed);
        assert_eq!(bed.world.component::<WorldPosition>(e).x, 1);
    }

    #[test]
    fn wall_hit_zeroes_horizontal_velocity_and_reports_side() {
        let mut bed = TestBed::new(GridMap::from_ascii(&["....#", "....#"]).unwrap());
        let e = body(
            &mut bed,
            Vector::new(1, 0),
            BoundingBox::UNIT,
            MovingBody::new(Velocity::new(2.0, 0.0), false),
        );
        tick(&mut bed);
        let events = tick(&mut bed);
        assert_eq!(bed.world.component::<WorldPosition>(e).x, 3);
        assert_eq!(bed.world.component::<MovingBody>(e).velocity.x, 0.0);
        assert_eq!(
            events,
            vec![GameEvent::CollidedWithWorld {
                entity: e,
                sides: CollisionSides {
                    right: true,
                    ..Default::default()
                },
            }]
        );
    }

    #[test]
    fn sequence_overrides_velocity_and_finishes() {
        let mut bed = TestBed::new(GridMap::empty(10, 10));
        let steps = vec![Vector::new(1, 0), Vector::new(0, -1), Vector::new(2, 0)];
        let e = body(
            &mut bed,
            Vector::new(2, 5),
            BoundingBox::UNIT,
            MovingBody::new(Velocity::new(-1.0, 0.0), false),
        );
        bed.world.add(e, MovementSequence::new(steps, false, true));

        for _ in 0..2 {
            tick(&mut bed);
            assert!(bed.world.has_component::<MovementSequence>(e));
        }
        tick(&mut bed);
        assert!(!bed.world.has_component::<MovementSequence>(e));
        assert_eq!(*bed.world.component::<WorldPosition>(e), Vector::new(5, 4));
        assert_eq!(
            bed.world.component::<MovingBody>(e).velocity,
            Velocity::default()
        );
    }

    #[test]
    fn repeating_sequence_loops() {
        let mut bed = TestBed::new(GridMap::empty(10, 10));
        let e = body(&mut bed, Vector::new(5, 5), BoundingBox::UNIT, resting());
        let steps = vec![Vector::new(1, 0), Vector::new(-1, 0)];
        bed.world.add(e, MovementSequence::new(steps, true, false));
        for _ in 0..5 {
            tick(&mut bed);
        }
        assert!(bed.world.has_component::<MovementSequence>(e));
        assert_eq!(*bed.world.component::<WorldPosition>(e), Vector::new(6, 5));
    }

    #[test]
    fn ghost_bodies_pass_through_walls_silently() {
        let mut bed = TestBed::new(GridMap::from_ascii(&["..#.."]).unwrap());
        let e = body(
            &mut bed,
            Vector::new(0, 0),
            BoundingBox::UNIT,
            MovingBody {
                ignore_collisions: true,
                ..MovingBody::new(Velocity::new(1.0, 0.0), false)
            },
        );
        let mut events = Vec::new();
        for _ in 0..3 {
            events.extend(tick(&mut bed));
        }
        assert_eq!(bed.world.component::<WorldPosition>(e).x, 3);
        assert!(events.is_empty());
    }

    #[test]
    fn suspended_and_dormant_bodies_do_not_move() {
        let mut bed = TestBed::new(GridMap::empty(10, 10));
        let suspended = body(
            &mut bed,
            Vector::new(1, 1),
            BoundingBox::UNIT,
            MovingBody {
                is_active: false,
                ..MovingBody::new(Velocity::new(1.0, 0.0), false)
            },
        );
        let dormant = bed.world.spawn((
            Vector::new(1, 3),
            BoundingBox::UNIT,
            MovingBody::new(Velocity::new(1.0, 0.0), false),
        ));
        tick(&mut bed);
        assert_eq!(bed.world.component::<WorldPosition>(suspended).x, 1);
        assert_eq!(bed.world.component::<WorldPosition>(dormant).x, 1);
    }

    #[test]
    fn phase2_only_moves_new_bodies() {
        let mut bed = TestBed::new(GridMap::empty(10, 10));
        let unit = BoundingBox::UNIT;
        let old = body(&mut bed, Vector::new(1, 1), unit, sliding_right());
        let marker = bed.world.spawn_marker();
        let new = body(&mut bed, Vector::new(1, 3), unit, sliding_right());

        let state = bed.state(0);
        let integrated = bed.run(|deps, world| update_phase2(deps, &state, world, marker));
        assert_eq!(integrated, 1);
        assert_eq!(bed.world.component::<WorldPosition>(old).x, 1);
        assert_eq!(bed.world.component::<WorldPosition>(new).x, 2);
    }

    #[test]
    #[should_panic(expected = "bounding_box")]
    fn body_without_box_is_rejected() {
        let mut bed = TestBed::new(GridMap::empty(10, 10));
        bed.world.spawn((
            Vector::new(1, 1),
            MovingBody::new(Velocity::default(), true),
            Active { on_screen: true },
        ));
        tick(&mut bed);
    }
}
