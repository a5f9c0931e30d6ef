//! Contact damage in both directions: player shots hitting shootables, and
//! hazards hitting the player.

use sable_ecs::world::World;

use crate::components::{
    Active, DamageInflicting, MovingBody, PlayerDamaging, Shootable, WorldPosition,
};
use crate::context::{GlobalDependencies, GlobalState};
use crate::events::{GameEvent, SoundId};
use crate::systems::world_box;

/// Apply every [`DamageInflicting`] entity to the first active
/// [`Shootable`] it overlaps.
///
/// A shootable that drops to zero health emits `ShootableKilled` while it
/// still exists, awards its score and is destroyed. A survivor emits
/// `ShootableDamaged` carrying the inflictor's velocity.
pub fn inflict_damage(deps: &mut GlobalDependencies<'_>, state: &GlobalState, world: &mut World) {
    world.each::<(DamageInflicting, WorldPosition)>(|world, inflictor| {
        let Some(inflictor_box) = world_box(world, inflictor) else {
            return;
        };
        let hit = |e| world_box(world, e).is_some_and(|b| b.intersects(&inflictor_box));
        let target = world
            .query::<(&Shootable, &Active)>()
            .map(|(e, _)| e)
            .find(|&e| e != inflictor && hit(e));
        let Some(target) = target else {
            return;
        };

        let damage = *world.component::<DamageInflicting>(inflictor);
        let inflictor_velocity = world
            .get::<MovingBody>(inflictor)
            .map(|body| body.velocity)
            .unwrap_or_default();
        if damage.destroy_on_contact {
            world.destroy(inflictor);
        }

        let shootable = world.component_mut::<Shootable>(target);
        shootable.health -= damage.amount;
        let shootable = *shootable;
        tracing::trace!(target = %target, health = shootable.health, "shootable hit");

        if shootable.health <= 0 {
            deps.emit(
                state,
                world,
                GameEvent::ShootableKilled {
                    entity: target,
                    inflictor_velocity,
                },
            );
            deps.player.give_score(shootable.given_score);
            deps.emit(
                state,
                world,
                GameEvent::ScoreAwarded {
                    amount: shootable.given_score,
                },
            );
            world.destroy(target);
        } else {
            deps.emit(
                state,
                world,
                GameEvent::ShootableDamaged {
                    entity: target,
                    inflictor_velocity,
                },
            );
            let sound = SoundId::EnemyHit;
            deps.emit(state, world, GameEvent::PlaySound { sound });
        }
    });
}

/// Count down mercy frames, then hurt the player for each active
/// [`PlayerDamaging`] entity overlapping them.
pub fn update_player_damage(
    deps: &mut GlobalDependencies<'_>,
    state: &GlobalState,
    world: &mut World,
) {
    deps.player.update_mercy_frames();
    let Some(player_box) = state.player_bounds else {
        return;
    };

    world.each::<(PlayerDamaging, WorldPosition, Active)>(|world, entity| {
        if !world_box(world, entity).is_some_and(|b| b.intersects(&player_box)) {
            return;
        }
        let damaging = *world.component::<PlayerDamaging>(entity);
        if !deps.player.take_damage(damaging.amount, deps.config.mercy_frames) {
            return;
        }

        let health = deps.player.health();
        tracing::debug!(source = %entity, amount = damaging.amount, health, "player hurt");
        deps.emit(
            state,
            world,
            GameEvent::PlayerTookDamage {
                amount: damaging.amount,
            },
        );
        let sound = SoundId::DukePain;
        deps.emit(state, world, GameEvent::PlaySound { sound });
        if damaging.destroy_on_contact {
            world.destroy(entity);
        }
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{BoundingBox, Player, Vector, Velocity};
    use crate::context::test_support::TestBed;
    use crate::map::GridMap;

    fn shot(bed: &mut TestBed, position: Vector) -> sable_ecs::entity::EntityId {
        bed.world.spawn((
            position,
            BoundingBox::UNIT,
            DamageInflicting {
                amount: 1,
                destroy_on_contact: true,
            },
            MovingBody::new(Velocity::new(2.0, 0.0), false),
        ))
    }

    #[test]
    fn surviving_shootable_reports_damage() {
        let mut bed = TestBed::new(GridMap::empty(10, 10));
        let enemy = bed.world.spawn((
            Vector::new(4, 4),
            BoundingBox::new(0, 0, 2, 2),
            Shootable {
                health: 2,
                given_score: 500,
            },
            Active { on_screen: true },
        ));
        let bullet = shot(&mut bed, Vector::new(5, 5));
        let state = bed.state(0);
        bed.run(|deps, world| inflict_damage(deps, &state, world));

        assert!(!bed.world.is_alive(bullet));
        assert_eq!(bed.world.component::<Shootable>(enemy).health, 1);
        assert_eq!(
            bed.emitted()[0],
            GameEvent::ShootableDamaged {
                entity: enemy,
                inflictor_velocity: Velocity::new(2.0, 0.0),
            }
        );
        assert_eq!(bed.player.score(), 0);
    }

    #[test]
    fn killed_shootable_awards_score_and_is_destroyed() {
        let mut bed = TestBed::new(GridMap::empty(10, 10));
        let enemy = bed.world.spawn((
            Vector::new(4, 4),
            BoundingBox::UNIT,
            Shootable {
                health: 1,
                given_score: 500,
            },
            Active { on_screen: true },
        ));
        shot(&mut bed, Vector::new(4, 4));
        let state = bed.state(0);
        bed.run(|deps, world| inflict_damage(deps, &state, world));

        assert!(!bed.world.is_alive(enemy));
        assert_eq!(bed.player.score(), 500);
        let events = bed.emitted();
        assert!(matches!(events[0], GameEvent::ShootableKilled { entity, .. } if entity == enemy));
        assert_eq!(events[1], GameEvent::ScoreAwarded { amount: 500 });
    }

    #[test]
    fn dormant_shootables_are_not_hit() {
        let mut bed = TestBed::new(GridMap::empty(10, 10));
        let enemy = bed.world.spawn((
            Vector::new(4, 4),
            Shootable {
                health: 1,
                given_score: 500,
            },
        ));
        let bullet = shot(&mut bed, Vector::new(4, 4));
        let state = bed.state(0);
        bed.run(|deps, world| inflict_damage(deps, &state, world));
        assert!(bed.world.is_alive(enemy));
        assert!(bed.world.is_alive(bullet));
    }

    #[test]
    fn mercy_frames_limit_player_damage() {
        let mut bed = TestBed::new(GridMap::empty(10, 10));
        bed.world.spawn((Player, Vector::new(2, 2), BoundingBox::new(0, 0, 1, 2)));
        bed.world.spawn((
            Vector::new(2, 3),
            PlayerDamaging {
                amount: 2,
                destroy_on_contact: false,
            },
            Active { on_screen: true },
        ));
        let state = bed.state(0);
        let full = bed.player.health();

        bed.run(|deps, world| update_player_damage(deps, &state, world));
        assert_eq!(bed.player.health(), full - 2);
        assert_eq!(
            bed.emitted(),
            vec![
                GameEvent::PlayerTookDamage { amount: 2 },
                GameEvent::PlaySound {
                    sound: SoundId::DukePain
                },
            ]
        );

        bed.run(|deps, world| update_player_damage(deps, &state, world));
        assert_eq!(bed.player.health(), full - 2);
        assert!(bed.emitted().is_empty());
    }

    #[test]
    fn single_use_hazard_is_destroyed_on_contact() {
        let mut bed = TestBed::new(GridMap::empty(10, 10));
        bed.world.spawn((Player, Vector::new(2, 2), BoundingBox::UNIT));
        let hazard = bed.world.spawn((
            Vector::new(2, 2),
            PlayerDamaging {
                amount: 1,
                destroy_on_contact: true,
            },
            Active { on_screen: false },
        ));
        let state = bed.state(0);
        bed.run(|deps, world| update_player_damage(deps, &state, world));
        assert!(!bed.world.is_alive(hazard));
    }
}
