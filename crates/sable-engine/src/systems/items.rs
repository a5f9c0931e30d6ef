//! Item pickup and item containers.

use sable_ecs::world::World;

use crate::components::{
    Active, CollectableItem, CollectableLetter, InventoryItem, ItemContainer, Vector, WorldPosition,
};
use crate::context::{GlobalDependencies, GlobalState};
use crate::events::{GameEvent, SoundId};
use crate::factory::ScoreNumber;
use crate::player::LetterCollectionState;
use crate::systems::world_box;

/// Score for the full set of letters in the right order.
pub const LETTER_BONUS_IN_ORDER: u32 = 100_000;

/// Score for any other letter pickup. Every such letter grants the
/// 10000 bonus on top of its 100 points, not only the one completing the
/// set.
pub const LETTER_SCORE: u32 = 10_100;

/// Horizontal offsets of the ten numbers celebrating a completed set.
const BONUS_NUMBER_X_OFFSETS: [i32; 4] = [-3, 0, 3, 0];

/// Pick up every active item overlapping the player.
pub fn collect_items(deps: &mut GlobalDependencies<'_>, state: &GlobalState, world: &mut World) {
    if deps.player.is_dead() {
        return;
    }
    let Some(player_box) = state.player_bounds else {
        return;
    };

    world.each::<(CollectableItem, WorldPosition, Active)>(|world, entity| {
        if !world_box(world, entity).is_some_and(|b| b.intersects(&player_box)) {
            return;
        }
        let item = *world.component::<CollectableItem>(entity);
        let position = *world.component::<WorldPosition>(entity);

        apply_item(deps, state, world, &item, position);
        deps.emit(state, world, GameEvent::ItemCollected { entity, item });
        tracing::debug!(entity = %entity, ?item, "item collected");
        world.destroy(entity);
    });
}

fn award_score(
    deps: &mut GlobalDependencies<'_>,
    state: &GlobalState,
    world: &mut World,
    amount: u32,
) {
    deps.player.give_score(amount);
    deps.emit(state, world, GameEvent::ScoreAwarded { amount });
}

fn play(deps: &mut GlobalDependencies<'_>, state: &GlobalState, world: &mut World, sound: SoundId) {
    deps.emit(state, world, GameEvent::PlaySound { sound });
}

fn apply_item(
    deps: &mut GlobalDependencies<'_>,
    state: &GlobalState,
    world: &mut World,
    item: &CollectableItem,
    position: WorldPosition,
) {
    let score = match item.given_score_at_full_health {
        Some(full_health_score) if deps.player.is_at_full_health() => Some(full_health_score),
        _ => item.given_score,
    };
    if let Some(score) = score.filter(|&s| s > 0) {
        award_score(deps, state, world, score);
        if item.spawn_score_numbers {
            spawn_score_numbers(deps, world, position, score);
        }
        play(deps, state, world, SoundId::ItemPickup);
    }

    if let Some(health) = item.given_health {
        deps.player.give_health(health);
        play(deps, state, world, SoundId::HealthPickup);
    }

    if let Some(inventory_item) = item.given_item {
        deps.player.give_item(inventory_item);
        let sound = if inventory_item == InventoryItem::RapidFire {
            SoundId::WeaponPickup
        } else {
            SoundId::ItemPickup
        };
        play(deps, state, world, sound);
    }

    if let Some(letter) = item.letter {
        collect_letter(deps, state, world, letter, position);
    }
}

fn collect_letter(
    deps: &mut GlobalDependencies<'_>,
    state: &GlobalState,
    world: &mut World,
    letter: CollectableLetter,
    position: WorldPosition,
) {
    match deps.player.add_letter(letter) {
        LetterCollectionState::InOrder => {
            award_score(deps, state, world, LETTER_BONUS_IN_ORDER);
            play(deps, state, world, SoundId::LettersCollectedCorrectly);
            for i in 0..10 {
                let x = BONUS_NUMBER_X_OFFSETS[i % BONUS_NUMBER_X_OFFSETS.len()];
                let at = position + Vector::new(x, -(i as i32));
                deps.factory
                    .create_floating_score_number(world, ScoreNumber::S10000, at);
            }
        }
        collection => {
            award_score(deps, state, world, LETTER_SCORE);
            play(deps, state, world, SoundId::ItemPickup);
            deps.factory
                .create_floating_score_number(world, ScoreNumber::S100, position);
            if collection == LetterCollectionState::WrongOrder {
                deps.emit(
                    state,
                    world,
                    GameEvent::PlayerMessage {
                        text: "Letters collected out of order.".to_owned(),
                    },
                );
            }
        }
    }
}

/// Split `score` greedily into number sprites, largest first.
pub fn score_number_breakdown(mut score: u32) -> Vec<ScoreNumber> {
    let mut numbers = Vec::new();
    for number in ScoreNumber::ALL {
        while score >= number.value() {
            score -= number.value();
            numbers.push(number);
        }
    }
    numbers
}

fn spawn_score_numbers(
    deps: &mut GlobalDependencies<'_>,
    world: &mut World,
    position: WorldPosition,
    score: u32,
) {
    for (i, number) in score_number_breakdown(score).into_iter().enumerate() {
        let at = position + Vector::new(0, -(i as i32));
        deps.factory.create_floating_score_number(world, number, at);
    }
}

/// Release a container's contents when its holder is killed.
pub fn handle_event(
    deps: &mut GlobalDependencies<'_>,
    _state: &GlobalState,
    world: &mut World,
    event: &GameEvent,
) {
    let GameEvent::ShootableKilled { entity, .. } = *event else {
        return;
    };
    let Some(container) = world.get::<ItemContainer>(entity).cloned() else {
        return;
    };
    let position = *world.component::<WorldPosition>(entity);
    let bounds = container.contents_bounds;
    let item = deps.factory.create_item(world, container.contents, bounds, position);
    tracing::debug!(container = %entity, item = %item, "container released item");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
