//! Player interaction with objects via the interact input.

use sable_ecs::world::World;

use crate::components::{Active, Interactable, Vector, WorldPosition};
use crate::context::{GlobalDependencies, GlobalState};
use crate::events::{GameEvent, SoundId};
use crate::systems::world_box;

/// Offset from the destination teleporter to where the player appears.
const TELEPORT_ARRIVAL_OFFSET: Vector = Vector::new(1, 0);

/// Use the active interactable the player stands in front of, on the tick
/// the interact input goes down. Holding it does nothing further.
pub fn update(deps: &mut GlobalDependencies<'_>, state: &GlobalState, world: &mut World) {
    if !state.interact_pressed() {
        return;
    }
    let Some(player_box) = state.player_bounds else {
        return;
    };

    let in_reach = |e| world_box(world, e).is_some_and(|b| b.intersects(&player_box));
    let source = world
        .query::<(&Interactable, &Active)>()
        .find(|&(e, _)| in_reach(e))
        .map(|(e, (kind, _))| (e, *kind));
    let Some((source, Interactable::Teleporter)) = source else {
        return;
    };

    let sound = SoundId::Teleport;
    deps.emit(state, world, GameEvent::PlaySound { sound });

    let target = world
        .query::<(&Interactable, &WorldPosition)>()
        .filter(|&(e, _)| e != source)
        .find(|(_, (kind, _))| **kind == Interactable::Teleporter)
        .map(|(_, (_, position))| *position + TELEPORT_ARRIVAL_OFFSET);
    match target {
        Some(target) => deps.emit(state, world, GameEvent::PlayerTeleported { target }),
        None => tracing::debug!(teleporter = %source, "teleporter has no destination"),
    }
}

/// Move the player entity when a teleport happens.
pub fn handle_event(state: &GlobalState, world: &mut World, event: &GameEvent) {
    let GameEvent::PlayerTeleported { target } = *event else {
        return;
    };
    let Some(player) = state.player.filter(|&p| world.is_alive(p)) else {
        return;
    };
    if let Some(position) = world.get_mut::<WorldPosition>(player) {
        *position = target;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
