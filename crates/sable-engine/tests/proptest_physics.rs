//! Property tests for tile collision and gravity.
//!
//! Random maps and random moves check that a sweep never ends inside solid
//! geometry and never overshoots, and that gravity only ever pushes
//! vertical speed toward the terminal velocity.

use proptest::prelude::*;
use sable_engine::physics::apply_gravity;
use sable_engine::prelude::*;

const SIZE: usize = 16;

/// A closed room: solid border plus the given interior solids.
fn room(solids: &[(usize, usize)]) -> GridMap {
    let mut map = GridMap::empty(SIZE, SIZE);
    for i in 0..SIZE {
        map.set_tile(0, i, 0, 1);
        map.set_tile(0, i, SIZE - 1, 1);
        map.set_tile(0, 0, i, 1);
        map.set_tile(0, SIZE - 1, i, 1);
    }
    for &(x, y) in solids {
        map.set_tile(0, x, y, 1);
    }
    map
}

fn solids_strategy() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((1..SIZE - 1, 1..SIZE - 1), 0..40)
}

proptest! {
    #[test]
    fn sweep_never_ends_inside_solid(
        solids in solids_strategy(),
        x in 1i32..12,
        y in 1i32..12,
        width in 1i32..4,
        height in 1i32..4,
        dx in -6i32..=6,
        dy in -6i32..=6,
    ) {
        let map = room(&solids);
        let checker = CollisionChecker::new(&map);
        let bbox = BoundingBox::new(0, 0, width, height);
        let start = Vector::new(x, y);
        prop_assume!(!checker.overlaps_solid(&bbox.to_world_space(start)));

        let result = checker.sweep_move(start, &bbox, Vector::new(dx, dy));

        prop_assert!(!checker.overlaps_solid(&bbox.to_world_space(start + result.delta)));
        prop_assert!(result.delta.x.abs() <= dx.abs());
        prop_assert!(result.delta.y.abs() <= dy.abs());
        prop_assert!(result.delta.x == 0 || result.delta.x.signum() == dx.signum());
        prop_assert!(result.delta.y == 0 || result.delta.y.signum() == dy.signum());
        prop_assert_eq!(result.blocked.horizontal(), result.delta.x != dx);
        prop_assert_eq!(result.blocked.vertical(), result.delta.y != dy);
    }

    #[test]
    fn gravity_is_monotonic_and_capped(
        initial in -4.0f32..4.0,
        ticks in 1usize..30,
    ) {
        let config = SimConfig::default();
        let mut body = MovingBody::new(Velocity::new(0.0, initial), true);
        let ceiling = initial.max(config.terminal_velocity);

        for _ in 0..ticks {
            let before = body.velocity.y;
            apply_gravity(&mut body, false, &config);
            prop_assert!(body.velocity.y >= before);
            prop_assert!(body.velocity.y <= ceiling);
        }
    }

    #[test]
    fn resting_body_stays_at_rest(remainder in -0.9f32..0.9) {
        let config = SimConfig::default();
        let mut body = MovingBody::new(Velocity::default(), true);
        body.remainder.y = remainder;
        apply_gravity(&mut body, true, &config);
        prop_assert_eq!(body.velocity.y, 0.0);
        prop_assert_eq!(body.remainder.y, 0.0);
    }
}
